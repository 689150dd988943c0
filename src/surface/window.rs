use super::{Color, DrawingSurface, Font};
use crate::{error::Error, geometry::Point};
use num_traits::ToPrimitive;
use opencv::{
    core::{Mat, Point2i, Rect, Scalar, Size, CV_8UC3},
    highgui,
    imgproc::{self, FILLED, FONT_HERSHEY_SIMPLEX, INTER_LINEAR, LINE_8, LINE_AA},
    prelude::*,
};

/// Pixel height of a Hershey simplex glyph at scale 1.0.
const HERSHEY_SIMPLEX_HEIGHT_PX: f64 = 22.0;

/// An OpenCV canvas shown in a highgui window.
pub(crate) struct Window {
    name: String,
    canvas: Mat,
    scratch: Mat,
    width: u32,
    height: u32,
}

fn to_i32(value: u32) -> Result<i32, Error> {
    value.to_i32().ok_or(Error::ConvertToI32)
}

fn to_point2i(point: Point) -> Result<Point2i, Error> {
    let x = point.x().round().to_i32();
    let y = point.y().round().to_i32();
    x.zip(y)
        .map(|(x, y)| Point2i::new(x, y))
        .ok_or(Error::ConvertPointToPoint2i(point))
}

// OpenCV wants BGR
fn to_scalar(Color { r, g, b }: Color) -> Scalar {
    Scalar::new(f64::from(b), f64::from(g), f64::from(r), 0.0)
}

impl Window {
    pub(crate) fn new(name: &str, width: u32, height: u32) -> Result<Self, Error> {
        let zeros = || {
            Mat::zeros(to_i32(height)?, to_i32(width)?, CV_8UC3)
                .and_then(|zeros| zeros.to_mat())
                .map_err(Error::AllocateCanvas)
        };
        highgui::named_window(name, highgui::WINDOW_AUTOSIZE).map_err(Error::ImShow)?;
        Ok(Self {
            name: name.to_owned(),
            canvas: zeros()?,
            scratch: zeros()?,
            width,
            height,
        })
    }

    fn rect(x: u32, y: u32, width: u32, height: u32) -> Result<Rect, Error> {
        Ok(Rect::new(to_i32(x)?, to_i32(y)?, to_i32(width)?, to_i32(height)?))
    }
}

impl DrawingSurface for Window {
    type Image = Mat;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<(), Error> {
        imgproc::rectangle(
            &mut self.canvas,
            Self::rect(x, y, width, height)?,
            Scalar::all(0.0),
            FILLED,
            LINE_8,
            0,
        )
        .map_err(Error::ClearRect)
    }

    fn draw_image(
        &mut self,
        image: &Self::Image,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<(), Error> {
        let size = Size::new(to_i32(width)?, to_i32(height)?);
        if (x, y, width, height) == (0, 0, self.width, self.height) {
            return imgproc::resize(image, &mut self.canvas, size, 0.0, 0.0, INTER_LINEAR)
                .map_err(Error::DrawImage);
        }
        imgproc::resize(image, &mut self.scratch, size, 0.0, 0.0, INTER_LINEAR)
            .map_err(Error::DrawImage)?;
        let mut roi =
            Mat::roi(&self.canvas, Self::rect(x, y, width, height)?).map_err(Error::DrawImage)?;
        self.scratch.copy_to(&mut roi).map_err(Error::DrawImage)
    }

    fn stroke_line(
        &mut self,
        from: Point,
        to: Point,
        width: u32,
        color: Color,
    ) -> Result<(), Error> {
        imgproc::line(
            &mut self.canvas,
            to_point2i(from)?,
            to_point2i(to)?,
            to_scalar(color),
            to_i32(width)?,
            LINE_AA,
            0,
        )
        .map_err(Error::DrawLine)
    }

    fn fill_circle(&mut self, center: Point, radius: u32, color: Color) -> Result<(), Error> {
        imgproc::circle(
            &mut self.canvas,
            to_point2i(center)?,
            to_i32(radius)?,
            to_scalar(color),
            FILLED,
            LINE_AA,
            0,
        )
        .map_err(Error::DrawCircle)
    }

    fn fill_text(&mut self, text: &str, at: Point, font: Font, color: Color) -> Result<(), Error> {
        // Hershey fonts are ASCII only
        let text = text.replace('°', " deg");
        let scale = f64::from(font.size_px) / HERSHEY_SIMPLEX_HEIGHT_PX;
        imgproc::put_text(
            &mut self.canvas,
            &text,
            to_point2i(at)?,
            FONT_HERSHEY_SIMPLEX,
            scale,
            to_scalar(color),
            2,       // thickness
            LINE_AA, // line_type
            false,   // bottom_left_origin
        )
        .map_err(Error::PutText)
    }

    fn present(&mut self) -> Result<(), Error> {
        highgui::imshow(&self.name, &self.canvas).map_err(Error::ImShow)
    }
}
