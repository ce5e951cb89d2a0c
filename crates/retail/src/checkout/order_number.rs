//! Order numbers: `ORD-YYYYMMDD-XXXXXX`, the UTC date plus six random uppercase
//! alphanumerics. Uniqueness is enforced by the Order actor's key check, not here.

use crate::model::OrderNumber;
use chrono::NaiveDate;
use rand::Rng;

const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 6;

pub fn generate(date: NaiveDate) -> OrderNumber {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(SUFFIX_CHARSET[rng.random_range(0..SUFFIX_CHARSET.len())]))
        .collect();
    OrderNumber(format!("ORD-{}-{suffix}", date.format("%Y%m%d")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_has_date_prefix_and_six_char_suffix() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let number = generate(date).0;

        let (prefix, suffix) = number.rsplit_once('-').unwrap();
        assert_eq!(prefix, "ORD-20261018");
        assert_eq!(suffix.len(), 6);
        assert!(suffix
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
    }
}
