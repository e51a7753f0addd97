//! Subcommand implementations

use std::fmt::Write as _;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::ops::Range;
use std::path::Path;

use anyhow::{bail, Context, Result};
use cadence_animation::{SegmentContent, Timeline, Tolerance};
use cadence_scene::{Composition, Scene, SceneFile, VisualState};
use serde::Serialize;
use tracing::{debug, info, warn};

pub struct RenderOptions {
    pub from: u32,
    pub to: Option<u32>,
    pub fps: Option<u32>,
    pub pretty: bool,
}

/// One line of `render` output
#[derive(Serialize)]
struct FrameRecord {
    frame: u32,
    state: Option<VisualState>,
}

fn load(path: &Path) -> Result<(SceneFile, Composition)> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file = SceneFile::from_toml_str(&source)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let composition = file
        .build()
        .with_context(|| format!("invalid scene in {}", path.display()))?;
    debug!(path = %path.display(), "scene file loaded");
    Ok((file, composition))
}

pub fn render(path: &Path, options: RenderOptions) -> Result<()> {
    let (file, composition) = load(path)?;
    let fps = options.fps.unwrap_or(file.fps);
    if fps == 0 {
        warn!("fps of 0 is treated as 1");
    }
    let frames = frame_range(&composition, options.from, options.to)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let count = write_frames(&mut out, &composition, frames, fps, options.pretty)?;
    out.flush()?;

    info!(frames = count, fps, "rendered");
    Ok(())
}

pub fn inspect(path: &Path) -> Result<()> {
    let (file, composition) = load(path)?;
    print!("{}", describe(&composition, file.fps));
    Ok(())
}

pub fn check(path: &Path) -> Result<()> {
    let (file, composition) = load(path)?;
    match composition.duration() {
        Some(duration) => println!(
            "ok: {} ({duration} frames at {} fps)",
            path.display(),
            file.fps
        ),
        None => println!("ok: {} (open-ended at {} fps)", path.display(), file.fps),
    }
    Ok(())
}

fn frame_range(composition: &Composition, from: u32, to: Option<u32>) -> Result<Range<u32>> {
    let Some(end) = to.or_else(|| composition.duration()) else {
        bail!("scene has no duration; pass --to");
    };
    if from > end {
        bail!("--from {from} is past the end frame {end}");
    }
    Ok(from..end)
}

/// Write one JSON object per frame; frames with nothing active get a null state
fn write_frames<W: Write>(
    out: &mut W,
    composition: &Composition,
    frames: Range<u32>,
    fps: u32,
    pretty: bool,
) -> Result<usize> {
    let mut count = 0;
    for frame in frames {
        let record = FrameRecord {
            frame,
            state: composition.resolve(frame, fps),
        };
        if pretty {
            serde_json::to_writer_pretty(&mut *out, &record)?;
        } else {
            serde_json::to_writer(&mut *out, &record)?;
        }
        writeln!(out)?;
        count += 1;
    }
    Ok(count)
}

fn describe(composition: &Composition, fps: u32) -> String {
    let mut text = String::new();
    match composition {
        Composition::Scene(scene) => describe_scene(&mut text, scene, fps, 0),
        Composition::Series(series) => {
            let _ = writeln!(
                text,
                "series: {} frames @ {fps} fps",
                series.total_duration()
            );
            describe_timeline(&mut text, series.timeline(), 0, fps, 1);
        }
    }
    text
}

fn describe_timeline(text: &mut String, timeline: &Timeline<Scene>, base: u32, fps: u32, depth: usize) {
    let indent = "  ".repeat(depth);
    for (offset, segment) in timeline.iter() {
        let start = base + offset;
        let _ = writeln!(
            text,
            "{indent}segment {}: {start}..{}",
            segment.name(),
            start + segment.duration()
        );
        match segment.content() {
            SegmentContent::Leaf(scene) => describe_scene(text, scene, fps, depth + 1),
            SegmentContent::Nested(inner) => describe_timeline(text, inner, start, fps, depth + 1),
        }
    }
}

fn describe_scene(text: &mut String, scene: &Scene, fps: u32, depth: usize) {
    let indent = "  ".repeat(depth);
    let duration = scene
        .duration()
        .map_or_else(|| "open-ended".to_string(), |frames| format!("{frames} frames"));
    let _ = writeln!(text, "{indent}scene {}: {duration} @ {fps} fps", scene.name());

    for phase in scene.phases().phases() {
        let _ = writeln!(
            text,
            "{indent}  phase {}: {}..{}",
            phase.name(),
            phase.start(),
            phase.end()
        );
    }

    for (name, channel) in scene.channels() {
        for (spring, release) in channel.springs() {
            let settle = match spring.settle_frames(fps, Tolerance::default()) {
                Some(frames) => format!("settles after {frames} frames"),
                None => "never settles".to_string(),
            };
            let _ = writeln!(
                text,
                "{indent}  spring {name}: {:?}, damping ratio {:.2}, released at frame {release}, {settle}",
                spring.regime(),
                spring.config().damping_ratio(),
            );
        }
    }
}
