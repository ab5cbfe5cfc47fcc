//! Palette System - Color Tables
//!
//! A palette table is read-only input to selection. The built-in table
//! is built once and never mutated; custom tables are passed per call.

use once_cell::sync::Lazy;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::generator::IdenticonError;

/// A 24-bit RGB color, no alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);

    /// Build from a packed `0xRRGGBB` value. Bits above 24 are dropped.
    pub const fn from_rgb(packed: u32) -> Self {
        Self(packed & 0xFF_FFFF)
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16 & 0xFF) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8 & 0xFF) as u8
    }

    pub const fn blue(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub const fn channels(self) -> [u8; 3] {
        [self.red(), self.green(), self.blue()]
    }

    pub const fn packed(self) -> u32 {
        self.0
    }

    /// Parse `#RRGGBB` or `RRGGBB`.
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_rgb)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawColor {
            Packed(u32),
            Hex(String),
        }

        match RawColor::deserialize(deserializer)? {
            RawColor::Packed(value) if value <= 0xFF_FFFF => Ok(Color(value)),
            RawColor::Packed(value) => Err(de::Error::custom(format!(
                "color {:#x} does not fit in 24 bits",
                value
            ))),
            RawColor::Hex(text) => Color::parse_hex(&text)
                .ok_or_else(|| de::Error::custom(format!("invalid color: {}", text))),
        }
    }
}

/// Ordered list of colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(Vec<Color>);

impl Palette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self(colors)
    }

    pub fn from_packed(values: &[u32]) -> Self {
        Self(values.iter().copied().map(Color::from_rgb).collect())
    }

    pub fn colors(&self) -> &[Color] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ordered list of palettes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaletteTable(Vec<Palette>);

impl PaletteTable {
    pub fn new(palettes: Vec<Palette>) -> Self {
        Self(palettes)
    }

    /// The built-in table shared by every generator that was not given one.
    pub fn builtin() -> &'static PaletteTable {
        &BUILTIN_TABLE
    }

    pub fn from_json_str(json: &str) -> Result<Self, IdenticonError> {
        serde_json::from_str(json).map_err(|e| IdenticonError::PaletteLoad(e.to_string()))
    }

    pub fn load_from_file(path: &Path) -> Result<Self, IdenticonError> {
        let content = fs::read_to_string(path)
            .map_err(|e| IdenticonError::PaletteLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }

    pub fn palettes(&self) -> &[Palette] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&Palette> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All colors of all palettes, in table order.
    pub fn flattened(&self) -> Vec<Color> {
        self.0.iter().flat_map(|p| p.colors().iter().copied()).collect()
    }
}

impl Default for PaletteTable {
    fn default() -> Self {
        BUILTIN_TABLE.clone()
    }
}

static BUILTIN_TABLE: Lazy<PaletteTable> = Lazy::new(|| {
    PaletteTable(DEFAULT_PALETTES.iter().map(|p| Palette::from_packed(p)).collect())
});

/// Built-in palettes as packed RGB values.
pub const DEFAULT_PALETTES: &[&[u32]] = &[
    &[0x69D2E7, 0xA7DBD8, 0xE0E4CC, 0xF38630, 0xFA6900],
    &[0xE94C6F, 0x542733, 0x5A6A62, 0xC6D5CD, 0xFDF200],
    &[0xDB3340, 0xE8B71A, 0xF7EAC8, 0x1FDA9A, 0x28ABE3],
    &[0x588C73, 0xF2E394, 0xF2AE72, 0xD96459, 0x8C4646],
    &[0xD0C91F, 0x85C4B9, 0x008BBA, 0xDF514C, 0xA82F2D],
    &[0x00B3DB, 0x59C4C5, 0xFFC33C, 0xFBE2B4, 0xFF4C65],
    &[0x5E412F, 0xFCEBB6, 0x78C0A8, 0xF07818, 0xF0A830],
    &[0xB1EB00, 0x53BBF4, 0xFF85CB, 0xFF432E, 0xFFAC00],
    &[0x4298B5, 0xADC4CC, 0x92B06A, 0xE19D29, 0xDD5F32],
    &[0xFFA200, 0x00A03E, 0x24A8AC, 0x0087CB, 0x982395],
    &[0x260126, 0x59323C, 0xF2EEB3, 0xBFAF80, 0x8C6954],
    &[0x3B3A35, 0x20457C, 0x5E3448, 0xFB6648, 0xECDFBD],
    &[0xE45F56, 0xA3D39C, 0x7ACCC8, 0x4AAAA5, 0x35404F],
    &[0x83AA30, 0x1499D3, 0x4D6684, 0x3D3D3D, 0xE74700],
    &[0xCFF09E, 0xA8DBA8, 0x79BD9A, 0x3B8686, 0x0B486B],
    &[0x774F38, 0xE08E79, 0xF1D4AF, 0xECE5CE, 0xC5E0DC],
    &[0xE8DDCB, 0xCDB380, 0x036564, 0x033649, 0x031634],
    &[0x490A3D, 0xBD1550, 0xE97F02, 0xF8CA00, 0x8A9B0F],
    &[0xD9CEB2, 0x948C75, 0xD5DED9, 0x7A6A53, 0x99B2B7],
    &[0x343838, 0x005F6B, 0x008C9E, 0x00B4CC, 0x00DFFC],
    &[0x99B898, 0xFECEA8, 0xFF847C, 0xE84A5F, 0x2A363B],
    &[0x413E4A, 0x73626E, 0xB38184, 0xF0B49E, 0xF7E4BE],
    &[0x554236, 0xF77825, 0xD3CE3D, 0xF1EFA5, 0x60B99A],
    &[0xFF4E50, 0xFC913A, 0xF9D423, 0xEDE574, 0xE1F5C4],
    &[0xFF4E50, 0xFC913A, 0xF9D423, 0xEDE574, 0xE1F5C4],
    &[0xD0DD2B, 0x98C73D, 0x00A9E0, 0x67CDDC, 0x3B3B3D],
    &[0xD0D102, 0xD70060, 0xE54028, 0xF18D05, 0x616161],
    &[0xE9F2B2, 0xEAA753, 0xBF87F3, 0x53E2EE, 0xD5126F],
    &[0xEAA753, 0xF3E88F, 0xFFF4E6, 0x869445, 0x84CEBF],
    &[0x164469, 0x729E31, 0xE0E03A, 0xE35D83, 0x87294A],
    &[0x40FB0E, 0x10C582, 0x06A2F5, 0x043266, 0x442AB2],
    &[0xF1EACD, 0xDED4B0, 0xD1B37D, 0x4394B2, 0x061326],
    &[0x4DB566, 0x14AFB6, 0x600876, 0x1E74B8, 0xBE2511],
    &[0xE6C78D, 0x306D3C, 0x1F4927, 0x7D8E80, 0x8A2214],
    &[0x83AF9B, 0xF16A83, 0xF9CDAD, 0xFC9D9A, 0x747462],
    &[0x042360, 0xFFC344, 0xFFF26B, 0xC1CEFF, 0x424244],
    &[0xFFBEE7, 0x70EABA, 0xFB4D36, 0xDF008D, 0xFFFFFF],
    &[0xFFFFFF, 0x768727, 0x8E7153, 0x201F1D, 0x323D12],
    &[0x481B5C, 0x4258FF, 0x0DC6FF, 0xADFFB8, 0xFFFAD1],
    &[0xF0F7FF, 0xD4D4FF, 0xB498F5, 0x9215D1, 0x21011B],
    &[0x3F4245, 0x784E5D, 0xD97E16, 0xFFB60D, 0xFFEF5C],
    &[0x10DAE8, 0xB8FF96, 0xDFFA11, 0xFFE603, 0xFFAB03],
    &[0x42FF8B, 0x90E53B, 0xE9FF42, 0xFFD642, 0xFFA742],
    &[0xBA0D66, 0xFC685B, 0xFCAE77, 0xFFEFBF, 0x0CE8F7],
    &[0x393042, 0x0A7AC4, 0x0CC3FA, 0x62E6F0, 0xDAEDDC],
    &[0xC2B4D1, 0x77C3E6, 0x3B9AFF, 0x0A64FF, 0x060017],
    &[0xD1ADF7, 0xF7CCAD, 0xFFA187, 0xFC6868, 0xFF406C],
    &[0x493B20, 0x2B5E33, 0x94AA23, 0xEFD816, 0xE3D9BE],
    &[0x210D21, 0xBF0867, 0xFF6524, 0xFFB45E, 0xFFF9C7],
    &[0x9074AB, 0xF1FF8A, 0x3A3142, 0xC25334, 0xC29A34],
    &[0x91C026, 0xCF8170, 0x976584, 0x703968, 0x4B0A13],
    &[0x0A8CF0, 0x74BACC, 0xE8D5CF, 0xF29D9D, 0xFF4596],
    &[0xF0ECDD, 0xFCBB9A, 0xFF7D63, 0xAB3F61, 0x08A5CC],
    &[0xF7EAB0, 0xFA8B1B, 0xD96F66, 0x625875, 0x003A78],
    &[0x9BBACF, 0x8AD1F2, 0xEBFEFF, 0xFFE9A8, 0xFFB057],
    &[0xEEEF84, 0xB9EF7D, 0x91EFD0, 0x91A6EF, 0xEC9BEF],
    &[0x2985CE, 0x57A9B4, 0x4A222A, 0xD2CECB, 0x6D5A32],
    &[0x3B4310, 0x6A7107, 0xC5C2BD, 0x87A7B2, 0x3B595B],
    &[0xBEB8C2, 0xDBCBB8, 0xEDBA9A, 0xFF8A78, 0xFF4782],
    &[0x587593, 0x9D886D, 0x575B66, 0xFEFEFE, 0xBFCBE3],
    &[0xFFD300, 0x989105, 0xEDE9EA, 0xFFAB63, 0xFF5827],
    &[0xFFF06B, 0xFFCE6B, 0xFF976B, 0xA65B6D, 0x0F82BF],
    &[0xA12323, 0xFF5757, 0xF2E67C, 0xA5CC52, 0x2B2740],
    &[0xB4ACBD, 0xD53141, 0x831010, 0xFFFFFF, 0xEE4131, 0xDED5D5, 0xFF835A, 0xFFAC9C],
    &[0xACACCD, 0x414183, 0x7383AC, 0x189C94, 0xBD314A, 0xEEEEFF, 0x396A94, 0xFF5241],
    &[0xFFFFFF, 0xC5C5D5, 0xE6E6EE, 0xF6D5B4, 0x523910, 0x525239, 0xC59C4A, 0x8B836A],
    &[0x735A8B, 0xC5BDEE, 0x4A3962, 0xCD4A20, 0xFF7B41, 0x7B2010, 0x6A6A6A, 0xFFFFFF],
    &[0x9CD54A, 0x4A5A20, 0x7394A4, 0x5A6A83, 0xC5E67B, 0x94B4C5, 0x29394A, 0xFFFFFF],
    &[0x5283C5, 0xFFFFFF, 0xD5D5DE, 0xBDBDBD, 0x183973, 0x525252, 0x8BA4E6, 0x7B7B7B],
    &[0xC5CD83, 0x836A20, 0x5A3900, 0xB49452, 0xBD7318, 0xF6B441, 0x009C20, 0x41DE41, 0xD5D5D5, 0xFFFFFF],
    &[0x62D5B4, 0x83EEC5, 0x184A4A, 0x73AC31, 0x317373, 0xBDFF73, 0xA4D541, 0xAC0031, 0xFF6A62, 0xEE2039],
    &[0xC5A47B, 0x524110, 0xDECD94, 0xFFFF94, 0x8B9462, 0x6A6A52, 0xA4AC7B, 0xD5BD83, 0xCDCDCD, 0xFFFFFF],
    &[0xEEAC41, 0x6A3908, 0x9C2920, 0xDE5A52, 0xFFFFFF, 0x5A5A62, 0x945A08, 0xFFE67B, 0xEE9C8B, 0x8B8B94],
    &[0xD5D5DE, 0xD54110, 0x52525A, 0xEE7B41, 0xFFC57B, 0x8B8B94, 0xEEEEEE, 0xAC1000, 0xAC5273, 0xF6838B],
    &[0xBD4A29, 0x732000, 0xBD735A, 0xDE7329, 0x835231, 0x5A3100, 0xF6BD7B, 0xA47341, 0xFFE6B4, 0xFFDE94],
    &[0x5ACDBD, 0x317B52, 0x104A39, 0xD5415A, 0x10414A, 0x7BD573, 0xFF7B7B, 0x83E6D5, 0x7B3129, 0x62AC5A],
    &[0x73A4A4, 0x5A7B6A, 0xACD5C5, 0x294A52, 0x6A5220, 0xAC9C5A, 0xB40000, 0xCDBD62, 0xEE5252, 0xEEE68B],
    &[0xACACD5, 0x735294, 0x524173, 0x9462CD, 0x31186A, 0xCDCDE6, 0x832041, 0xE68B9C, 0xCD394A, 0xAC83DE],
    &[0xEED56A, 0xF6EE94, 0xD5A4DE, 0xA46AB4, 0x8B52AC, 0x62317B, 0xC5B429, 0xDEDEDE, 0xA42000, 0xD5CD6A],
    &[0xC5395A, 0x8BD5EE, 0xFF6262, 0xEEAC9C, 0x085A73, 0x08ACD5, 0xF6D5C5, 0xFFFFFF, 0x5ABDE6, 0x7B2941],
    &[0x8BB4A4, 0xD5F6DE, 0x524A4A, 0xFFFFFF, 0x8B8B8B, 0x5A8362, 0xB4D5BD, 0x52CDF6, 0xFF8B4A, 0x2983AC],
];
