use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame, RgbImage, Rgba};
use imageproc::drawing::draw_line_segment_mut;
use tracing::info;

use crate::error::{PfResult, PixelForgeError};

const PROGRESS_LINE: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// Renders the commit-by-commit snapshot trail as a looping GIF. A green
/// line tracks the row being processed, moving down one row every time the
/// frame index crosses a row boundary; rows that committed nothing are
/// crossed in the same step.
pub fn render_gif<P: AsRef<Path>>(
    snapshots: &[RgbImage],
    row_marks: &[usize],
    path: P,
    delay_ms: u32,
) -> PfResult<()> {
    if snapshots.is_empty() {
        return Err(PixelForgeError::Validation(
            "no snapshots to animate; run the scan with snapshot recording enabled".to_string(),
        ));
    }

    let file = File::create(&path)?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    encoder.set_repeat(Repeat::Infinite)?;

    let rows = line_rows(snapshots.len(), row_marks);
    for (snapshot, &line_row) in snapshots.iter().zip(rows.iter()) {
        let mut canvas = DynamicImage::ImageRgb8(snapshot.clone()).to_rgba8();
        let width = canvas.width();
        draw_line_segment_mut(
            &mut canvas,
            (0.0, line_row as f32),
            (width.saturating_sub(1) as f32, line_row as f32),
            PROGRESS_LINE,
        );

        let frame = Frame::from_parts(canvas, 0, 0, Delay::from_numer_denom_ms(delay_ms, 1));
        encoder.encode_frame(frame)?;
    }

    info!(
        frames = snapshots.len(),
        path = %path.as_ref().display(),
        "animation written"
    );
    Ok(())
}

/// Row the progress line sits on in each frame. `row_marks[y]` is the
/// cumulative snapshot count when row y finished, so the line steps past
/// every row whose mark the frame index has reached.
fn line_rows(frame_count: usize, row_marks: &[usize]) -> Vec<usize> {
    let mut rows = Vec::with_capacity(frame_count);
    let mut line_row = 0usize;
    let mut next_mark = 0usize;
    for index in 0..frame_count {
        while next_mark < row_marks.len() && row_marks[next_mark] == index {
            next_mark += 1;
            line_row += 1;
        }
        rows.push(line_row);
    }
    rows
}
