//! Fixed display-color tables for the dashboards: one per subject name, one
//! per score band. Pure lookups, no state.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The five score tiers, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    One,
    Two,
    Three,
    Four,
    Five,
}

/// Threshold ladder. The >= at 90 against > below is deliberate and locked
/// by tests: 90 is band One, 75 is band Three, 60 is band Four, 50 is band
/// Five.
pub fn band_for_score(score: i64) -> Band {
    if score >= 90 {
        Band::One
    } else if score > 75 {
        Band::Two
    } else if score > 60 {
        Band::Three
    } else if score > 50 {
        Band::Four
    } else {
        Band::Five
    }
}

impl Band {
    pub fn color(self) -> Rgb {
        match self {
            Band::One => Rgb::new(46, 204, 113),
            Band::Two => Rgb::new(129, 199, 132),
            Band::Three => Rgb::new(255, 152, 0),
            Band::Four => Rgb::new(255, 235, 59),
            Band::Five => Rgb::new(231, 76, 60),
        }
    }
}

pub fn grade_color(score: i64) -> Rgb {
    band_for_score(score).color()
}

/// Subject label color. Matching lower-cases the input, so "MATHEMATICS"
/// hits the mathematics entry while "MATH" falls through to the neutral
/// default.
pub fn subject_color(subject: &str) -> Rgb {
    match subject.to_lowercase().as_str() {
        "mathematics" => Rgb::new(0, 123, 255),
        "science" => Rgb::new(26, 188, 156),
        "history" => Rgb::new(241, 196, 15),
        "english" => Rgb::new(231, 76, 60),
        "ict" => Rgb::new(93, 173, 226),
        _ => Rgb::new(120, 144, 156),
    }
}
