use crate::{camera::BlankFrame, error::Error, geometry::Point};

#[cfg(feature = "gui")]
mod window;
#[cfg(feature = "gui")]
pub(crate) use window::Window;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Color {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Color {
    pub(crate) const RED: Self = Self::rgb(255, 0, 0);
    pub(crate) const GREEN: Self = Self::rgb(0, 128, 0);
    pub(crate) const BLUE: Self = Self::rgb(0, 0, 255);
    pub(crate) const YELLOW: Self = Self::rgb(255, 255, 0);

    pub(crate) const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Font {
    pub(crate) size_px: u32,
}

/// The drawing primitives the overlay needs from a canvas.
pub(crate) trait DrawingSurface {
    type Image;

    /// Canvas width and height in pixels.
    fn size(&self) -> (u32, u32);

    fn clear_rect(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<(), Error>;

    /// Draw `image` scaled into the given rectangle.
    fn draw_image(
        &mut self,
        image: &Self::Image,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<(), Error>;

    fn stroke_line(&mut self, from: Point, to: Point, width: u32, color: Color)
        -> Result<(), Error>;

    fn fill_circle(&mut self, center: Point, radius: u32, color: Color) -> Result<(), Error>;

    fn fill_text(&mut self, text: &str, at: Point, font: Font, color: Color)
        -> Result<(), Error>;

    /// Hand the finished frame to the display.
    fn present(&mut self) -> Result<(), Error>;
}

/// Number of primitive calls made against a [`Tally`] surface.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub(crate) struct Counts {
    pub(crate) images: usize,
    pub(crate) lines: usize,
    pub(crate) circles: usize,
    pub(crate) texts: usize,
    pub(crate) presented: usize,
}

/// A surface that draws nothing and counts what it was asked to draw.
#[derive(Debug)]
pub(crate) struct Tally {
    width: u32,
    height: u32,
    counts: Counts,
}

impl Tally {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            counts: Counts::default(),
        }
    }

    pub(crate) fn counts(&self) -> Counts {
        self.counts
    }
}

impl DrawingSurface for Tally {
    type Image = BlankFrame;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, _x: u32, _y: u32, _width: u32, _height: u32) -> Result<(), Error> {
        Ok(())
    }

    fn draw_image(
        &mut self,
        _image: &Self::Image,
        _x: u32,
        _y: u32,
        _width: u32,
        _height: u32,
    ) -> Result<(), Error> {
        self.counts.images += 1;
        Ok(())
    }

    fn stroke_line(
        &mut self,
        _from: Point,
        _to: Point,
        _width: u32,
        _color: Color,
    ) -> Result<(), Error> {
        self.counts.lines += 1;
        Ok(())
    }

    fn fill_circle(&mut self, _center: Point, _radius: u32, _color: Color) -> Result<(), Error> {
        self.counts.circles += 1;
        Ok(())
    }

    fn fill_text(
        &mut self,
        _text: &str,
        _at: Point,
        _font: Font,
        _color: Color,
    ) -> Result<(), Error> {
        self.counts.texts += 1;
        Ok(())
    }

    fn present(&mut self) -> Result<(), Error> {
        self.counts.presented += 1;
        Ok(())
    }
}
