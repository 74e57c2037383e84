/// A single style value as the toolkit understands it.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Px(i32),
    Text(String),
    Flag(bool),
}

/// Ordered list of style properties; later entries win on conflict.
pub type StyleProps = Vec<(String, StyleValue)>;

/// Nine-point alignment plus the out-of-parent placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Center,
    TopLeft,
    TopMid,
    TopRight,
    LeftMid,
    RightMid,
    BottomLeft,
    BottomMid,
    BottomRight,
    OutTopMid,
    OutBottomMid,
}

impl Align {
    pub fn as_str(self) -> &'static str {
        match self {
            Align::Center => "center",
            Align::TopLeft => "top_left",
            Align::TopMid => "top_mid",
            Align::TopRight => "top_right",
            Align::LeftMid => "left_mid",
            Align::RightMid => "right_mid",
            Align::BottomLeft => "bottom_left",
            Align::BottomMid => "bottom_mid",
            Align::BottomRight => "bottom_right",
            Align::OutTopMid => "out_top_mid",
            Align::OutBottomMid => "out_bottom_mid",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "center" => Some(Align::Center),
            "top_left" => Some(Align::TopLeft),
            "top_mid" => Some(Align::TopMid),
            "top_right" => Some(Align::TopRight),
            "left_mid" => Some(Align::LeftMid),
            "right_mid" => Some(Align::RightMid),
            "bottom_left" => Some(Align::BottomLeft),
            "bottom_mid" => Some(Align::BottomMid),
            "bottom_right" => Some(Align::BottomRight),
            "out_top_mid" => Some(Align::OutTopMid),
            "out_bottom_mid" => Some(Align::OutBottomMid),
            _ => None,
        }
    }
}

/// Alignment plus pixel offsets, the argument to `align`/`align_to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignSpec {
    pub align: Align,
    pub x_ofs: i32,
    pub y_ofs: i32,
}

impl AlignSpec {
    pub fn new(align: Align) -> Self {
        Self {
            align,
            x_ofs: 0,
            y_ofs: 0,
        }
    }
}
