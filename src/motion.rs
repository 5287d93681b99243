use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ParseError, ParseErrorKind};
use crate::parse::ParseOptions;
use crate::reader::LineReader;
use crate::rotation::{axis_angle_to_quaternion, identity, multiply};
use crate::skeleton::Bone;
use crate::types::*;

static RE_FRAMES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Frames:\s*(\S+)$").expect("valid regex"));
static RE_FRAME_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Frame\s+Time:\s*(\S+)$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MotionHeader {
    pub frame_count: usize,
    pub frame_time: f64,
}

/// Build one keyframe from the values of a single bone, `values[i]` belonging to `channels[i]`.
/// Rotation values are in degrees and are composed in channel order.
fn read_keyframe(channels: &[ChannelKind], values: &[f64], time: f64) -> Keyframe {
    let mut position = Position::new(0.0, 0.0, 0.0);
    let mut rotation = identity();
    for (&channel, &value) in channels.iter().zip(values) {
        if channel.is_rotation() {
            let step = axis_angle_to_quaternion(channel.axis().unit(), value.to_radians());
            rotation = multiply(rotation, step);
        } else {
            match channel.axis() {
                Axis::X => position.x = value,
                Axis::Y => position.y = value,
                Axis::Z => position.z = value,
            }
        }
    }
    Keyframe {
        time,
        position,
        rotation,
    }
}

/// Reads the MOTION section (header line already consumed) and appends one keyframe per row
/// to every non End Site node, walking `nodes` in hierarchy order.
pub(crate) fn decode_motion(
    reader: &mut LineReader,
    nodes: &mut [Bone],
    options: &ParseOptions,
) -> Result<MotionHeader, ParseError> {
    //// Frames: <n>
    let line = reader.expect_line()?;
    let frame_count = RE_FRAMES
        .captures(line.text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .ok_or_else(|| line.error(ParseErrorKind::InvalidFrameCount))?;

    //// Frame Time: <t>
    let line = reader.expect_line()?;
    let frame_time = RE_FRAME_TIME
        .captures(line.text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|t| t.is_finite() && *t > 0.0)
        .ok_or_else(|| line.error(ParseErrorKind::InvalidFrameTime))?;

    if frame_count == 0 {
        log::warn!("BVH declares 0 frames");
    }

    // frame_count is untrusted, so frame vectors grow one row at a time
    let channels_per_row: usize = nodes.iter().map(|n| n.channels.len()).sum();

    //// one row per frame
    for frame in 0..frame_count {
        let line = reader
            .next_line()
            .ok_or_else(|| reader.eof_error())
            .map_err(|err| ParseError { kind: ParseErrorKind::TruncatedFrameData, ..err })?;
        let values = line
            .tokens()
            .map(|s| s.parse::<f64>().ok().filter(|v| v.is_finite()))
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| line.error(ParseErrorKind::InvalidFrameValue))?;
        if values.len() < channels_per_row {
            return Err(line.error(ParseErrorKind::TruncatedFrameData));
        }
        if values.len() > channels_per_row {
            if options.strict_trailing_values {
                return Err(line.error(ParseErrorKind::TrailingFrameData));
            }
            log::warn!(
                "Line {}: ignoring {} values beyond the {} declared channels",
                line.number,
                values.len() - channels_per_row,
                channels_per_row
            );
        }

        let time = frame as f64 * frame_time;
        let mut rest = values.as_slice();
        for node in nodes.iter_mut().filter(|n| !n.is_end_site()) {
            let (taken, remaining) = rest.split_at(node.channels.len());
            node.frames.push(read_keyframe(&node.channels, taken, time));
            rest = remaining;
        }
    }

    let mut extra_rows = 0;
    while reader.next_line().is_some() {
        extra_rows += 1;
    }
    if extra_rows > 0 {
        log::warn!(
            "Ignoring {} motion rows after the {} declared frames",
            extra_rows,
            frame_count
        );
    }

    log::debug!(
        "Decoded motion: {} frames at {}s per frame",
        frame_count,
        frame_time
    );
    Ok(MotionHeader {
        frame_count,
        frame_time,
    })
}
