use std::fs::File;
use std::io::{ BufWriter, Write };
use std::path::Path;

use crate::color::{ self, Color };
use crate::error::{ Result, TracerError };
use crate::tile::RenderTile;

/// The output image: a dense row-major grid of pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![color::BLACK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn read_pixel(&self, x: usize, y: usize) -> Result<Color> {
        self.index_of(x, y).map(|i| self.pixels[i])
    }

    pub fn write_pixel(&mut self, x: usize, y: usize, color: Color)
        -> Result<()> {
        let i = self.index_of(x, y)?;
        self.pixels[i] = color;
        Ok(())
    }

    fn index_of(&self, x: usize, y: usize) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(TracerError::PixelOutOfRange {
                x, y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y * self.width + x)
    }

    /// Copies a rendered tile into the canvas. `pixels` holds the tile's
    /// rows top to bottom, `tile.width` entries each.
    pub fn blit(&mut self, tile: &RenderTile, pixels: &[Color]) -> Result<()> {
        if pixels.len() != tile.width * tile.height {
            return Err(TracerError::TileBufferMismatch {
                expected: tile.width * tile.height,
                got: pixels.len(),
            });
        }

        for row in 0..tile.height {
            let start = self.index_of(tile.x, tile.y + row)?;
            let source = &pixels[row * tile.width..(row + 1) * tile.width];
            self.pixels[start..start + tile.width].copy_from_slice(source);
        }

        Ok(())
    }

    /// Serializes the canvas as plain-text PPM (P3), one pixel per line.
    pub fn to_ppm(&self) -> String {
        let mut ppm = format!("P3\n{} {}\n255\n", self.width, self.height);

        for pixel in &self.pixels {
            ppm.push_str(&format!("{} {} {}\n", pixel.r, pixel.g, pixel.b));
        }

        ppm
    }

    /// Writes the canvas to `path` in PPM format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(self.to_ppm().as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/* Tests */

#[test]
fn new_canvas_is_black() {
    let canvas = Canvas::new(4, 3);

    for y in 0..3 {
        for x in 0..4 {
            assert_eq!(canvas.read_pixel(x, y).unwrap(), color::BLACK);
        }
    }
}

#[test]
fn pixel_round_trip_and_bounds() {
    let mut canvas = Canvas::new(4, 3);

    canvas.write_pixel(2, 1, color::RED).unwrap();
    assert_eq!(canvas.read_pixel(2, 1).unwrap(), color::RED);

    assert!(matches!(canvas.write_pixel(4, 0, color::RED),
        Err(TracerError::PixelOutOfRange { .. })));
    assert!(matches!(canvas.read_pixel(0, 3),
        Err(TracerError::PixelOutOfRange { .. })));
}

#[test]
fn blit_places_a_tile() {
    let mut canvas = Canvas::new(4, 4);
    let tile = RenderTile { x: 2, y: 1, width: 2, height: 2 };

    canvas.blit(&tile, &[color::RED, color::GREEN,
                         color::BLUE, color::WHITE]).unwrap();

    assert_eq!(canvas.read_pixel(2, 1).unwrap(), color::RED);
    assert_eq!(canvas.read_pixel(3, 1).unwrap(), color::GREEN);
    assert_eq!(canvas.read_pixel(2, 2).unwrap(), color::BLUE);
    assert_eq!(canvas.read_pixel(3, 2).unwrap(), color::WHITE);
    assert_eq!(canvas.read_pixel(0, 0).unwrap(), color::BLACK);
}

#[test]
fn blit_rejects_mismatched_buffers() {
    let mut canvas = Canvas::new(4, 4);
    let tile = RenderTile { x: 0, y: 0, width: 2, height: 2 };

    assert!(matches!(canvas.blit(&tile, &[color::RED]),
        Err(TracerError::TileBufferMismatch { expected: 4, got: 1 })));
}

#[test]
fn ppm_header_and_body() {
    let mut canvas = Canvas::new(2, 2);
    canvas.write_pixel(0, 0, color::RED).unwrap();

    let ppm = canvas.to_ppm();
    let mut lines = ppm.lines();

    assert_eq!(lines.next(), Some("P3"));
    assert_eq!(lines.next(), Some("2 2"));
    assert_eq!(lines.next(), Some("255"));
    assert_eq!(lines.next(), Some("255 0 0"));
    assert_eq!(lines.next(), Some("0 0 0"));
    assert_eq!(ppm.lines().count(), 3 + 4);
}
