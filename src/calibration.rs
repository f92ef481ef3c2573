/// DAC/ADC calibration words, in register order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub gain_dac: u32,
    pub offset_dac: u32,
    pub gain_adc: u32,
    pub offset_adc: u32,
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration {
            gain_dac: 2048,
            offset_dac: 82,
            gain_adc: 4252,
            offset_adc: 228,
        }
    }
}

impl Calibration {
    /// Build from command-line values. Exactly four values are used as
    /// given; any other count falls back to the defaults.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        match args {
            [gain_dac, offset_dac, gain_adc, offset_adc] => Calibration {
                gain_dac: register_value(gain_dac.as_ref()),
                offset_dac: register_value(offset_dac.as_ref()),
                gain_adc: register_value(gain_adc.as_ref()),
                offset_adc: register_value(offset_adc.as_ref()),
            },
            _ => Calibration::default(),
        }
    }

    pub fn words(&self) -> [u32; 4] {
        [self.gain_dac, self.offset_dac, self.gain_adc, self.offset_adc]
    }
}

/// Convert a command-line value into a register word.
///
/// The text is read as a floating point number the way C's `atof` does
/// (longest numeric prefix, 0 when there is none), truncated toward zero
/// into an `i32` and stored as its two's complement bit pattern. Values
/// outside the `i32` range saturate; NaN becomes 0.
pub fn register_value(text: &str) -> u32 {
    parse_float_prefix(text) as i32 as u32
}

fn parse_float_prefix(text: &str) -> f64 {
    let s = text
        .trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b')
        .as_bytes();
    let (negative, rest) = match s.first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let magnitude = if let Some(v) = parse_special(rest) {
        v
    } else if rest.len() > 2 && rest[0] == b'0' && (rest[1] | 0x20) == b'x' {
        // "0x" followed by no hex digit reads as 0
        parse_hex(&rest[2..]).unwrap_or(0.0)
    } else {
        parse_decimal(rest)
    };

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

fn parse_special(s: &[u8]) -> Option<f64> {
    let lower: Vec<u8> = s.iter().take(8).map(|b| b.to_ascii_lowercase()).collect();
    if lower.starts_with(b"inf") {
        Some(f64::INFINITY)
    } else if lower.starts_with(b"nan") {
        Some(f64::NAN)
    } else {
        None
    }
}

fn parse_decimal(s: &[u8]) -> f64 {
    let digits = |from: usize| s[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let int_len = digits(0);
    let mut end = int_len;
    let mut frac_len = 0;
    if s.get(end) == Some(&b'.') {
        frac_len = digits(end + 1);
        if int_len + frac_len > 0 {
            end += 1 + frac_len;
        }
    }
    if int_len + frac_len == 0 {
        return 0.0;
    }

    if matches!(s.get(end), Some(b'e') | Some(b'E')) {
        let mut exp = end + 1;
        if matches!(s.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_len = digits(exp);
        if exp_len > 0 {
            end = exp + exp_len;
        }
    }

    // ASCII digits, dot and exponent only
    std::str::from_utf8(&s[..end])
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(0.0)
}

fn parse_hex(s: &[u8]) -> Option<f64> {
    let mut value = 0.0f64;
    let mut scale = 0i32;
    let mut seen = false;
    let mut i = 0;

    while let Some(d) = s.get(i).and_then(|b| (*b as char).to_digit(16)) {
        value = value * 16.0 + d as f64;
        seen = true;
        i += 1;
    }
    if s.get(i) == Some(&b'.') {
        i += 1;
        while let Some(d) = s.get(i).and_then(|b| (*b as char).to_digit(16)) {
            value = value * 16.0 + d as f64;
            scale -= 4;
            seen = true;
            i += 1;
        }
    }
    if !seen {
        return None;
    }

    if matches!(s.get(i), Some(b'p') | Some(b'P')) {
        let mut j = i + 1;
        let negative = match s.get(j) {
            Some(b'-') => {
                j += 1;
                true
            }
            Some(b'+') => {
                j += 1;
                false
            }
            _ => false,
        };
        let start = j;
        let mut exp = 0i32;
        while let Some(d) = s.get(j).filter(|b| b.is_ascii_digit()) {
            exp = exp.saturating_mul(10).saturating_add((d - b'0') as i32);
            j += 1;
        }
        if j > start {
            scale = scale.saturating_add(if negative { -exp } else { exp });
        }
    }

    Some(value * 2f64.powi(scale))
}
