//! Page layout calculations

/// Simple length type in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length(pub f64);

impl Length {
    /// Create a length from millimeters
    pub fn from_mm(mm: f64) -> Self {
        Length(mm)
    }

    /// Create a length from inches
    pub fn from_inches(inches: f64) -> Self {
        Length(inches * 25.4)
    }

    /// Create a length from points (1/72 inch)
    pub fn from_pt(pt: f64) -> Self {
        Length(pt * 25.4 / 72.0)
    }

    /// Get the value in millimeters
    pub fn mm(&self) -> f64 {
        self.0
    }

    /// Get the value in points (1/72 inch)
    pub fn pt(&self) -> f64 {
        self.0 * 72.0 / 25.4
    }
}

/// Page dimensions
#[derive(Debug, Clone, Copy)]
pub struct PageDimensions {
    pub width: Length,
    pub height: Length,
}

impl PageDimensions {
    /// A4 size (210mm × 297mm)
    pub fn a4() -> Self {
        Self {
            width: Length::from_mm(210.0),
            height: Length::from_mm(297.0),
        }
    }
}

/// Margins for page content
#[derive(Debug, Clone, Copy)]
pub struct Margins {
    pub top: Length,
    pub bottom: Length,
    pub left: Length,
    pub right: Length,
}

impl Margins {
    /// Create margins with same value on all sides
    pub fn uniform(margin: Length) -> Self {
        Self {
            top: margin,
            bottom: margin,
            left: margin,
            right: margin,
        }
    }

    /// Narrow margins (0.5 inches), as used on the receipt
    pub fn narrow() -> Self {
        Self::uniform(Length::from_inches(0.5))
    }
}

/// Page size plus margins, with the content-area math the composer needs.
///
/// The coordinate system has origin at bottom-left of the page.
#[derive(Debug, Clone, Copy)]
pub struct PageGeometry {
    pub page: PageDimensions,
    pub margins: Margins,
}

impl PageGeometry {
    /// A4 with 0.5-inch margins, the fixed receipt page setup
    pub fn receipt() -> Self {
        Self {
            page: PageDimensions::a4(),
            margins: Margins::narrow(),
        }
    }

    /// Printable width in points
    pub fn content_width(&self) -> f64 {
        self.page.width.pt() - self.margins.left.pt() - self.margins.right.pt()
    }

    /// Left edge of the content area in points
    pub fn content_left(&self) -> f64 {
        self.margins.left.pt()
    }

    /// Right edge of the content area in points
    pub fn content_right(&self) -> f64 {
        self.page.width.pt() - self.margins.right.pt()
    }

    /// Top edge of the content area in points (origin bottom-left)
    pub fn content_top(&self) -> f64 {
        self.page.height.pt() - self.margins.top.pt()
    }

    /// Bottom edge of the content area in points
    pub fn content_bottom(&self) -> f64 {
        self.margins.bottom.pt()
    }
}

/// How table column widths are determined
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnSizing {
    /// Divide the printable width evenly across visible columns
    Even,
    /// Size each column by its longest cell text, clamped to min/max points
    Auto { min_pt: f64, max_pt: f64 },
}

impl ColumnSizing {
    /// Default clamp range for auto-sized columns
    pub fn auto() -> Self {
        ColumnSizing::Auto {
            min_pt: 30.0,
            max_pt: 160.0,
        }
    }
}

/// How footers learn the total page count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNumbering {
    /// Render once to learn the count, then stamp footers (exact)
    TwoPassExact,
    /// Predict the count from row heuristics and stamp inline.
    /// Can under/overcount when row heights vary; kept for parity with the
    /// single-pass variant.
    SinglePassEstimate,
}

/// Where table page breaks come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBreaking {
    /// Break when the next row would not fit in the content area
    Flow,
    /// Break after every N data rows (overflow still forces a break)
    FixedChunk(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversions() {
        let len = Length::from_inches(1.0);
        assert!((len.mm() - 25.4).abs() < 0.01);
        assert!((len.pt() - 72.0).abs() < 0.01);
        assert!((Length::from_pt(72.0).mm() - 25.4).abs() < 0.01);
    }

    #[test]
    fn test_a4_size() {
        let a4 = PageDimensions::a4();
        assert!((a4.width.pt() - 595.28).abs() < 0.01);
        assert!((a4.height.pt() - 841.89).abs() < 0.01);
    }

    #[test]
    fn test_receipt_geometry() {
        let geometry = PageGeometry::receipt();
        // 0.5 inch margins = 36pt on each side
        assert!((geometry.content_left() - 36.0).abs() < 0.01);
        assert!((geometry.content_width() - (595.28 - 72.0)).abs() < 0.01);
        assert!(geometry.content_top() > geometry.content_bottom());
    }
}
