use std::fmt;

/// One of the sixteen general purpose registers `r0`..`r15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register(u8);

impl Register {
    pub const R0: Register = Register(0);
    /// Holds the return address written by `call`.
    pub const LINK: Register = Register(15);

    pub fn new(index: u8) -> Option<Self> {
        if index < 16 {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Accepts `r0`..`r15` (either case of the `r`).
    pub fn parse(name: &str) -> Option<Self> {
        let digits = name.strip_prefix(['r', 'R'])?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<u8>().ok().and_then(Self::new)
    }

    pub fn as_u8(&self) -> u8 {
        self.0
    }

    pub fn as_u32(&self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A 16 bit immediate field, stored as its two's complement bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Imm16(u16);

impl Imm16 {
    pub const ZERO: Imm16 = Imm16(0);
    pub const ONE: Imm16 = Imm16(1);

    /// Values in `-32768..=65535`; negative values wrap to their two's complement.
    pub fn from_i64(value: i64) -> Option<Self> {
        if (i16::MIN as i64..=u16::MAX as i64).contains(&value) {
            Some(Self((value & 0xFFFF) as u16))
        } else {
            None
        }
    }

    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// A literal as written in source: exactly sixteen `0`/`1` digits are taken
    /// verbatim, anything else is read as a decimal integer.
    pub fn parse(text: &str) -> Option<Self> {
        if text.len() == 16 && text.bytes().all(|b| b == b'0' || b == b'1') {
            return u16::from_str_radix(text, 2).ok().map(Self);
        }
        text.parse::<i64>().ok().and_then(Self::from_i64)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }

    pub fn as_u32(&self) -> u32 {
        self.0 as u32
    }

    /// The field read back as a signed value.
    pub fn as_i16(&self) -> i16 {
        self.0 as i16
    }
}

impl fmt::Display for Imm16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016b}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_names() {
        assert_eq!(Register::parse("r0"), Some(Register::R0));
        assert_eq!(Register::parse("R15"), Some(Register::LINK));
        assert_eq!(Register::parse("r16"), None);
        assert_eq!(Register::parse("r"), None);
        assert_eq!(Register::parse("r+1"), None);
        assert_eq!(Register::parse("x1"), None);
        assert_eq!(Register::parse("r300"), None);
    }

    #[test]
    fn every_signed_value_survives_the_field() {
        for n in i16::MIN..=i16::MAX {
            let imm = Imm16::from_i64(n as i64).unwrap();
            assert_eq!(imm.as_i16(), n);
        }
    }

    #[test]
    fn range_limits() {
        assert_eq!(Imm16::from_i64(65535).map(|i| i.as_u16()), Some(0xFFFF));
        assert_eq!(Imm16::from_i64(-1).map(|i| i.as_u16()), Some(0xFFFF));
        assert_eq!(Imm16::from_i64(-32768).map(|i| i.as_u16()), Some(0x8000));
        assert_eq!(Imm16::from_i64(65536), None);
        assert_eq!(Imm16::from_i64(-32769), None);
    }

    #[test]
    fn binary_literals_are_verbatim() {
        assert_eq!(Imm16::parse("0000000000000101"), Some(Imm16::from_bits(5)));
        assert_eq!(Imm16::parse("1000000000000000"), Some(Imm16::from_bits(0x8000)));
        // fifteen digits is a decimal number
        assert_eq!(Imm16::parse("000000000000101"), Some(Imm16::from_bits(101)));
        assert_eq!(Imm16::parse("-5").map(|i| i.to_string()), Some("1111111111111011".to_string()));
        assert_eq!(Imm16::parse("abc"), None);
    }
}
