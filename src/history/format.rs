//! Display formatting for currency amounts, days, months and category labels.

use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use unicode_segmentation::UnicodeSegmentation;

/// The currency symbol shown in front of every amount.
pub const CURRENCY_SYMBOL: &str = "R$";

/// Full month names, index 0 is January.
pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// The max number of graphemes to display for a category label before
/// truncating and displaying ellipses.
const MAX_LABEL_GRAPHEMES: usize = 32;

/// Which thousands and decimal separators to use for amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumberLocale {
    /// `1.234,56`
    #[default]
    PtBr,
    /// `1,234.56`
    EnUs,
}

impl NumberLocale {
    fn separators(self) -> (char, char) {
        match self {
            Self::PtBr => ('.', ','),
            Self::EnUs => (',', '.'),
        }
    }
}

impl fmt::Display for NumberLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PtBr => write!(f, "pt-br"),
            Self::EnUs => write!(f, "en-us"),
        }
    }
}

impl FromStr for NumberLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" => Ok(Self::PtBr),
            "en-us" => Ok(Self::EnUs),
            other => Err(format!(
                "unsupported locale \"{other}\", expected \"pt-br\" or \"en-us\""
            )),
        }
    }
}

/// Format `amount` with the currency symbol, thousands separators and exactly
/// two decimal places, e.g. `R$ 1.234,50` or `-R$ 12,00`.
pub fn format_currency(amount: Decimal, locale: NumberLocale) -> String {
    let rounded = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let whole = rounded.trunc();
    let cents = ((rounded - whole) * Decimal::ONE_HUNDRED)
        .to_u32()
        .unwrap_or_default();

    let (thousands, decimal) = locale.separators();
    let digits = whole.to_string();
    let digits = digits.split('.').next().unwrap_or_default();
    let grouped = group_thousands(digits, thousands);
    let sign = if amount.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    format!("{sign}{CURRENCY_SYMBOL} {grouped}{decimal}{cents:02}")
}

/// Insert `separator` between every group of three digits, counting from the right.
fn group_thousands(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(digit);
    }

    grouped
}

/// Format a day of the month as two digits, e.g. `5` → `"05"`.
pub fn format_day(day: u8) -> String {
    format!("{day:02}")
}

/// The full name of `month` (1 to 12), or `None` for any other number.
pub fn month_name(month: u8) -> Option<&'static str> {
    usize::from(month)
        .checked_sub(1)
        .and_then(|index| MONTH_NAMES.get(index))
        .copied()
}

/// Shorten long labels for display.
///
/// Returns the text to show and, if it was truncated, the full label for a
/// tooltip.
pub fn truncate_label(label: &str) -> (String, Option<&str>) {
    let label_length = label.graphemes(true).count();

    if label_length <= MAX_LABEL_GRAPHEMES {
        (label.to_owned(), None)
    } else {
        let truncated: String = label
            .graphemes(true)
            .take(MAX_LABEL_GRAPHEMES - 3)
            .collect();
        (truncated + "...", Some(label))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::{
        NumberLocale, format_currency, format_day, group_thousands, month_name, truncate_label,
    };

    #[test]
    fn currency_has_two_decimals_and_pt_br_separators() {
        assert_eq!(
            format_currency(Decimal::new(123456, 2), NumberLocale::PtBr),
            "R$ 1.234,56"
        );
        assert_eq!(
            format_currency(Decimal::from(1500), NumberLocale::PtBr),
            "R$ 1.500,00"
        );
        assert_eq!(
            format_currency(Decimal::new(1230, 2), NumberLocale::PtBr),
            "R$ 12,30"
        );
    }

    #[test]
    fn currency_uses_en_us_separators() {
        assert_eq!(
            format_currency(Decimal::new(123456789, 2), NumberLocale::EnUs),
            "R$ 1,234,567.89"
        );
    }

    #[test]
    fn currency_groups_amounts_of_a_trillion_and_more() {
        let amount = |text: &str| Decimal::from_str(text).unwrap();

        assert_eq!(
            format_currency(amount("1234567890123.45"), NumberLocale::PtBr),
            "R$ 1.234.567.890.123,45"
        );
        assert_eq!(
            format_currency(amount("999999999999999"), NumberLocale::PtBr),
            "R$ 999.999.999.999.999,00"
        );
        assert_eq!(
            format_currency(amount("12345678901234567.89"), NumberLocale::EnUs),
            "R$ 12,345,678,901,234,567.89"
        );
        assert_eq!(
            format_currency(amount("-1000000000000"), NumberLocale::EnUs),
            "-R$ 1,000,000,000,000.00"
        );
    }

    #[test]
    fn groups_digits_in_threes_from_the_right() {
        assert_eq!(group_thousands("0", '.'), "0");
        assert_eq!(group_thousands("999", '.'), "999");
        assert_eq!(group_thousands("1000", '.'), "1.000");
        assert_eq!(group_thousands("123456", ','), "123,456");
        assert_eq!(group_thousands("1234567", ','), "1,234,567");
    }

    #[test]
    fn currency_formats_zero_and_negative_amounts() {
        assert_eq!(format_currency(Decimal::ZERO, NumberLocale::PtBr), "R$ 0,00");
        assert_eq!(
            format_currency(Decimal::new(-4550, 2), NumberLocale::PtBr),
            "-R$ 45,50"
        );
        assert_eq!(
            format_currency(Decimal::new(-1, 3), NumberLocale::PtBr),
            "R$ 0,00"
        );
    }

    #[test]
    fn currency_rounds_half_away_from_zero() {
        assert_eq!(
            format_currency(Decimal::new(10005, 3), NumberLocale::EnUs),
            "R$ 10.01"
        );
        assert_eq!(
            format_currency(Decimal::new(9999, 3), NumberLocale::EnUs),
            "R$ 10.00"
        );
    }

    #[test]
    fn day_is_zero_padded() {
        assert_eq!(format_day(5), "05");
        assert_eq!(format_day(31), "31");
    }

    #[test]
    fn month_names_start_at_january() {
        assert_eq!(month_name(1), Some("Janeiro"));
        assert_eq!(month_name(12), Some("Dezembro"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn parses_locales() {
        assert_eq!("pt-BR".parse(), Ok(NumberLocale::PtBr));
        assert_eq!("en_US".parse(), Ok(NumberLocale::EnUs));
        assert!("fr-fr".parse::<NumberLocale>().is_err());
    }

    #[test]
    fn truncates_long_labels() {
        let label = "Alimentação (Supermercado do bairro perto de casa)";

        let (text, full) = truncate_label(label);

        assert_eq!(text.chars().count(), 32);
        assert!(text.ends_with("..."));
        assert_eq!(full, Some(label));
        assert_eq!(truncate_label("Salário"), ("Salário".to_owned(), None));
    }
}
