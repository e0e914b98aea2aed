/// RGB triple stored exactly as the GPU background/foreground layers expect it
/// (three tightly packed bytes, no alpha).
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };
    pub const DEFAULT_FG: Color = Color {
        r: 205,
        g: 214,
        b: 244,
    }; // #CDD6F4
    pub const DEFAULT_BG: Color = Color {
        r: 30,
        g: 30,
        b: 46,
    }; // #1E1E2E

    // Base 16 colors: 0-7 normal, 8-15 bright.
    pub const ANSI: [Color; 16] = [
        Color::rgb(69, 71, 90),    //  0 black    #45475A
        Color::rgb(243, 139, 168), //  1 red      #F38BA8
        Color::rgb(166, 227, 161), //  2 green    #A6E3A1
        Color::rgb(249, 226, 175), //  3 yellow   #F9E2AF
        Color::rgb(137, 180, 250), //  4 blue     #89B4FA
        Color::rgb(245, 194, 231), //  5 magenta  #F5C2E7
        Color::rgb(148, 226, 213), //  6 cyan     #94E2D5
        Color::rgb(186, 194, 222), //  7 white    #BAC2DE
        Color::rgb(88, 91, 112),   //  8 br black #585B70
        Color::rgb(243, 139, 168), //  9 br red
        Color::rgb(166, 227, 161), // 10 br green
        Color::rgb(249, 226, 175), // 11 br yellow
        Color::rgb(137, 180, 250), // 12 br blue
        Color::rgb(245, 194, 231), // 13 br magenta
        Color::rgb(148, 226, 213), // 14 br cyan
        Color::rgb(166, 173, 200), // 15 br white #A6ADC8
    ];

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    /// 256-color palette: 0-15 = ANSI, 16-231 = 6x6x6 color cube, 232-255 = grayscale
    pub fn from_256(n: u8) -> Color {
        match n {
            0..=15 => Color::ANSI[n as usize],
            16..=231 => {
                let n = n - 16;
                let r = n / 36;
                let g = (n % 36) / 6;
                let b = n % 6;
                Color {
                    r: if r > 0 { 55 + r * 40 } else { 0 },
                    g: if g > 0 { 55 + g * 40 } else { 0 },
                    b: if b > 0 { 55 + b * 40 } else { 0 },
                }
            }
            232..=255 => {
                let v = 8 + (n - 232) * 10;
                Color { r: v, g: v, b: v }
            }
        }
    }

    /// Linear blend from `self` towards `other`; `t` is clamped to `0..=1`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}
