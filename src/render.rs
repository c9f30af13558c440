/// A drawing target for the field.
///
/// Coordinates and sizes are in surface pixels; a grid cell at `(x, y)` is drawn as the square
/// at `(x * S, y * S)` with side `S`, the configured cell size.
pub trait Surface {
    /// Blank the whole surface
    fn clear(&mut self);

    /// Fill the `size` by `size` square whose top left corner is `(x, y)`
    fn fill_cell(&mut self, x: usize, y: usize, size: usize);
}

/// Hex values of braille dots
///
/// ```text
///  1   8
///  2  10
///  4  20
/// 40  80
/// ```
///
/// Where the base blank pattern is codepoint `0x2800` (or U+2800)
///
/// To get other configurations, just add the numbers above.
const BRAILLE_EMPTY: u32 = 0x2800;

/// A pixel canvas rendered as braille text, 2x4 pixels per character.
pub struct Canvas {
    /// The cell buffer
    cb: Vec<bool>,

    /// The frame buffer.
    fb: String,

    /// Codepoints. This allows us to construct the framebuffer more easily
    cp: Vec<u32>,

    /// Width of the canvas, in pixels
    w: usize,

    /// Height of the canvas, in pixels
    h: usize,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        // For each braille character, we need 3 bytes:
        //  - The leader byte:     0b11100010
        //  - Continuation byte 1: 0b101000xx
        //  - Continuation byte 2: 0b10xxxxxx
        // For each newline, we need one byte: 0b00001010
        //
        // `bw = ceil(w / 2)` and `bh = ceil(h / 4)` are the width and height of the framebuffer
        // in braille characters, so it takes at most `3 * (bw * bh) + bh` bytes.
        let (bw, bh) = (w.div_ceil(2), h.div_ceil(4));

        Self {
            cb: vec![false; w * h],
            fb: String::with_capacity(3 * (bw * bh) + bh),
            cp: vec![BRAILLE_EMPTY; bw * bh],
            w,
            h,
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    /// Size of the rendered text, in terminal columns and rows
    pub fn text_size(&self) -> (usize, usize) {
        (self.w.div_ceil(2), self.h.div_ceil(4))
    }

    /// Turns on a single pixel. Pixels off the canvas are dropped.
    pub fn draw_pixel(&mut self, x: usize, y: usize) {
        if x < self.w && y < self.h {
            let i = self.xy_from(x, y);
            self.cb[i] = true;
        }
    }

    /// Turns on a square of pixels, clipped to the canvas
    pub fn draw_square(&mut self, x: usize, y: usize, s: usize) {
        let x_end = x.saturating_add(s).min(self.w);
        let y_end = y.saturating_add(s).min(self.h);

        for y in y..y_end {
            for x in x..x_end {
                let i = self.xy_from(x, y);
                self.cb[i] = true;
            }
        }
    }

    /// Reset the cell buffer
    pub fn reset(&mut self) {
        self.cb.fill(false);
    }

    /// Turn the pixels into braille text, one line per 4 pixel rows, each line ending in `\n`
    pub fn render(&mut self) -> &str {
        let bw = self.w.div_ceil(2);

        // compute new codepoints
        self.cp.fill(BRAILLE_EMPTY);

        for (n, &px) in self.cb.iter().enumerate() {
            if px {
                let (x, y) = self.xy_to(n);
                self.cp[(y / 4) * bw + (x / 2)] += Self::get_hex_value(x, y);
            }
        }

        // update framebuffer
        self.fb.clear();

        for (i, &c) in self.cp.iter().enumerate() {
            if i > 0 && i % bw == 0 {
                self.fb.push('\n');
            }

            // Every sum of dot values stays within the braille block
            self.fb.push(char::from_u32(c).unwrap_or(' '));
        }
        self.fb.push('\n');

        &self.fb
    }

    fn xy_to(&self, n: usize) -> (usize, usize) {
        (n % self.w, n / self.w)
    }

    fn xy_from(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    fn get_hex_value(x: usize, y: usize) -> u32 {
        match (x % 2, y % 4) {
            (0, 0) => 0x1,
            (1, 0) => 0x8,
            (0, 1) => 0x2,
            (1, 1) => 0x10,
            (0, 2) => 0x4,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => unreachable!(),
        }
    }
}

impl Surface for Canvas {
    fn clear(&mut self) {
        self.reset();
    }

    fn fill_cell(&mut self, x: usize, y: usize, size: usize) {
        self.draw_square(x, y, size);
    }
}
