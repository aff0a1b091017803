use serde::{Deserialize, Serialize};

/// 16-bit RGB color as stored in LAS point formats 2, 3, 5, 7, 8 and 10.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct Color {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl Color {
    pub fn new(red: u16, green: u16, blue: u16) -> Self {
        Self { red, green, blue }
    }

    pub fn r(&self) -> u16 {
        self.red
    }

    pub fn g(&self) -> u16 {
        self.green
    }

    pub fn b(&self) -> u16 {
        self.blue
    }
}

impl From<las::Color> for Color {
    fn from(color: las::Color) -> Self {
        Self::new(color.red, color.green, color.blue)
    }
}
