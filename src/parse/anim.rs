//! Section parsers for skins and animations.

use crate::arena::{IntArena, IntSlice, StrArena};
use crate::lex::{key8, Cursor};
use crate::types::{
    AccessorRef, AnimChannel, AnimSampler, Animation, Interpolation, Skin, TargetPath,
};
use crate::util::{Error, Result};

use super::parse_int_array;

fn fresh_skin() -> Skin {
    Skin {
        name: None,
        skeleton: -1,
        inverse_bind_matrices: None,
        joints: IntSlice::EMPTY,
    }
}

/// Parse the `skins` array. The inverse-bind-matrix field keeps its accessor
/// index until the accessors table is complete; resolution rewrites it into
/// a span. Unrecognized keys are skipped over by the key scan.
pub(crate) fn parse_skins(
    cur: &mut Cursor,
    strings: &mut StrArena,
    ints: &mut IntArena,
    skins: &mut Vec<Skin>,
) -> Result<()> {
    cur.skip_after(b'"'); // rest of the section key
    let mut skin = fresh_skin();
    loop {
        loop {
            if cur.at_end() {
                return Ok(());
            }
            match cur.peek() {
                b'"' => break,
                b'}' => {
                    skins.push(skin);
                    skin = fresh_skin();
                    cur.bump();
                }
                b']' => {
                    cur.bump();
                    return Ok(());
                }
                _ => cur.bump(),
            }
        }
        cur.bump();

        if cur.key_is(b"inverseBindMatr") {
            skin.inverse_bind_matrices =
                Some(AccessorRef::Pending(cur.parse_uint().max(0) as u32));
        } else if cur.key_is(b"skeleton") {
            skin.skeleton = cur.parse_uint();
        } else if cur.key_is(b"name") {
            cur.skip_after(b'"');
            skin.name = Some(strings.intern(cur.quoted()));
        } else if cur.key_is(b"joints") {
            skin.joints = parse_int_array(cur, ints);
        }
    }
}

const SAMPLER: u64 = key8(b"sampler");
const NODE: u64 = key8(b"node");
const TARGET: u64 = key8(b"target");
const PATH: u64 = key8(b"path");
const INPUT: u64 = key8(b"input");
const OUTPUT: u64 = key8(b"output");
const INTERPOL: u64 = key8(b"interpol");

/// Parse one `channels` array.
fn parse_channels(cur: &mut Cursor, channels: &mut Vec<AnimChannel>) -> Result<()> {
    cur.skip_after(b'"'); // rest of the "channels" key
    let mut channel = AnimChannel::default();
    let mut in_target = false;
    loop {
        loop {
            if cur.at_end() {
                return Ok(());
            }
            match cur.peek() {
                b'"' => break,
                b']' => {
                    cur.bump();
                    return Ok(());
                }
                b'}' => {
                    // the nested target object closes before the channel does
                    if in_target {
                        in_target = false;
                    } else {
                        channels.push(channel);
                        channel = AnimChannel::default();
                    }
                    cur.bump();
                }
                _ => cur.bump(),
            }
        }
        match cur.hash_quoted() {
            SAMPLER => channel.sampler = cur.parse_uint(),
            NODE => channel.target_node = cur.parse_uint(),
            TARGET => in_target = true,
            PATH => {
                cur.skip_after(b'"');
                channel.target_path = match cur.peek() {
                    b't' => TargetPath::Translation,
                    b'r' => TargetPath::Rotation,
                    b's' => TargetPath::Scale,
                    _ => return Err(Error::Unknown),
                };
                cur.skip_after(b'"');
            }
            _ => return Err(Error::Unknown),
        }
    }
}

/// Parse one animation `samplers` array. Input and output keep their
/// accessor indices until resolution.
fn parse_anim_samplers(cur: &mut Cursor, samplers: &mut Vec<AnimSampler>) -> Result<()> {
    cur.skip_after(b'"'); // rest of the "samplers" key
    let mut sampler = AnimSampler::default();
    loop {
        loop {
            if cur.at_end() {
                return Ok(());
            }
            match cur.peek() {
                b'"' => break,
                b']' => {
                    cur.bump();
                    return Ok(());
                }
                b'}' => {
                    samplers.push(sampler);
                    sampler = AnimSampler::default();
                    cur.bump();
                }
                _ => cur.bump(),
            }
        }
        match cur.hash_quoted() {
            INPUT => sampler.input = AccessorRef::Pending(cur.parse_uint().max(0) as u32),
            OUTPUT => sampler.output = AccessorRef::Pending(cur.parse_uint().max(0) as u32),
            INTERPOL => {
                cur.skip_after(b'"');
                sampler.interpolation = match cur.peek() {
                    b'L' => Interpolation::Linear,
                    b'S' => Interpolation::Step,
                    b'C' => Interpolation::CubicSpline,
                    _ => return Err(Error::Unknown),
                };
                cur.skip_after(b'"');
            }
            _ => return Err(Error::Unknown),
        }
    }
}

/// Parse the `animations` array: name plus channel and sampler lists per
/// animation. Durations are filled by resolution.
pub(crate) fn parse_animations(
    cur: &mut Cursor,
    strings: &mut StrArena,
    animations: &mut Vec<Animation>,
) -> Result<()> {
    cur.skip_after(b'"'); // rest of the section key
    let mut anim = Animation::default();
    let mut channels: Vec<AnimChannel> = Vec::new();
    let mut samplers: Vec<AnimSampler> = Vec::new();
    loop {
        loop {
            if cur.at_end() {
                return Ok(());
            }
            match cur.peek() {
                b'"' => break,
                b'}' => {
                    anim.channels = std::mem::take(&mut channels);
                    anim.samplers = std::mem::take(&mut samplers);
                    animations.push(std::mem::take(&mut anim));
                    cur.bump();
                }
                b']' => {
                    cur.bump();
                    return Ok(());
                }
                _ => cur.bump(),
            }
        }
        cur.bump();

        if cur.key_is(b"name") {
            cur.skip_after(b'"');
            anim.name = Some(strings.intern(cur.quoted()));
        } else if cur.key_is(b"channels") {
            parse_channels(cur, &mut channels)?;
        } else if cur.key_is(b"samplers") {
            parse_anim_samplers(cur, &mut samplers)?;
        }
    }
}
