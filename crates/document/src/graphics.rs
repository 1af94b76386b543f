use crate::error::PdfError;

/// Path construction operators written straight into page content.
///
/// Implementors only provide [`Graphics::add_content`]; coordinates are in
/// points with three decimals.
pub trait Graphics {
    /// Appends one line of raw content-stream operators.
    fn add_content(&mut self, text: &str) -> Result<(), PdfError>;

    /// Begins a new subpath at `(x, y)`.
    fn move_to(&mut self, x: f64, y: f64) -> Result<(), PdfError> {
        self.add_content(&format!("{:.3} {:.3} m", x, y))
    }

    /// Appends a straight segment to `(x, y)`.
    fn line_to(&mut self, x: f64, y: f64) -> Result<(), PdfError> {
        self.add_content(&format!("{:.3} {:.3} l", x, y))
    }

    fn stroke(&mut self) -> Result<(), PdfError> {
        self.add_content("S")
    }

    /// `move_to` + `line_to` + `stroke`.
    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64)) -> Result<(), PdfError> {
        self.move_to(from.0, from.1)?;
        self.line_to(to.0, to.1)?;
        self.stroke()
    }
}
