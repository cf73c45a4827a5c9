use std::fmt;

use rust_decimal::Decimal;

/// One fetch result. A new fetch always produces a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSnapshot {
    price: Decimal,
    change_percent: Decimal,
}

impl PriceSnapshot {
    pub fn new(price: Decimal, change_percent: Decimal) -> Self {
        Self {
            price,
            change_percent,
        }
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn change_percent(&self) -> Decimal {
        self.change_percent
    }

    pub fn sign(&self) -> ChangeSign {
        ChangeSign::of(self.change_percent)
    }

    /// Change magnitude without its own sign, trailing zeros dropped.
    pub fn change_magnitude(&self) -> Decimal {
        self.change_percent.abs().normalize()
    }

    /// Text shown as the bot's presence, e.g. `$0.0123 (+3.5%)`.
    pub fn status_text(&self) -> String {
        format!(
            "${} ({}{}%)",
            self.price,
            self.sign(),
            self.change_magnitude()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSign {
    Up,
    Down,
    Flat,
}

impl ChangeSign {
    pub fn of(change: Decimal) -> Self {
        if change.is_zero() {
            ChangeSign::Flat
        } else if change.is_sign_negative() {
            ChangeSign::Down
        } else {
            ChangeSign::Up
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeSign::Up => "+",
            ChangeSign::Down => "-",
            ChangeSign::Flat => "",
        }
    }
}

impl fmt::Display for ChangeSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
