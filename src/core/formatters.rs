//! Input masks for Brazilian identifiers and amounts.
//!
//! Every mask first drops anything that is not an ASCII digit, then formats the
//! digits typed so far, so a half-typed value is shown with the separators it
//! already reached.

use crate::domain::model::FieldKind;
use regex::Regex;
use std::sync::LazyLock;

static GROUP_3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{3})(\d)").unwrap());
static TAIL_3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{3})(\d{1,2})$").unwrap());
static CNPJ_HEAD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{2})(\d)").unwrap());
static CNPJ_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})\.(\d{3})(\d)").unwrap());
static CNPJ_BRANCH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.(\d{3})(\d)").unwrap());
static CNPJ_CHECK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{4})(\d)").unwrap());
static PHONE_AREA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{2})(\d)").unwrap());
static PHONE_LOCAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{5})(\d)").unwrap());
static RG_HEAD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{2})(\d)").unwrap());
static CEP_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{5})(\d)").unwrap());

pub const CPF_DIGITS: usize = 11;
pub const CNPJ_MAX_LEN: usize = 18;
pub const PHONE_MAX_LEN: usize = 15;
pub const RG_MAX_LEN: usize = 12;
pub const CEP_MAX_LEN: usize = 9;
pub const CEP_DIGITS: usize = 8;

pub fn only_digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// CPF (`000.000.000-00`) up to 11 digits, CNPJ (`00.000.000/0000-00`) above.
pub fn format_tax_id(value: &str) -> String {
    let v = only_digits(value);
    if v.len() <= CPF_DIGITS {
        let v = GROUP_3.replace(&v, "${1}.${2}");
        let v = GROUP_3.replace(&v, "${1}.${2}");
        TAIL_3.replace(&v, "${1}-${2}").into_owned()
    } else {
        let v = CNPJ_HEAD.replace(&v, "${1}.${2}");
        let v = CNPJ_BODY.replace(&v, "${1}.${2}.${3}");
        let v = CNPJ_BRANCH.replace(&v, ".${1}/${2}");
        let v = CNPJ_CHECK.replace(&v, "${1}-${2}");
        truncate(&v, CNPJ_MAX_LEN)
    }
}

/// `(DD) DDDDD-DDDD`. Ten-digit landlines get the dash one digit late; the mask
/// has a single layout.
pub fn format_phone(value: &str) -> String {
    let v = only_digits(value);
    let v = PHONE_AREA.replace(&v, "(${1}) ${2}");
    let v = PHONE_LOCAL.replace(&v, "${1}-${2}");
    truncate(&v, PHONE_MAX_LEN)
}

/// RG: `00.000.000-0`.
pub fn format_rg(value: &str) -> String {
    let v = only_digits(value);
    let v = RG_HEAD.replace(&v, "${1}.${2}");
    let v = GROUP_3.replace(&v, "${1}.${2}");
    let v = TAIL_3.replace(&v, "${1}-${2}");
    truncate(&v, RG_MAX_LEN)
}

/// CEP: `00000-000`.
pub fn format_cep(value: &str) -> String {
    let v = only_digits(value);
    let v = CEP_SPLIT.replace(&v, "${1}-${2}");
    truncate(&v, CEP_MAX_LEN)
}

/// True once a (masked or raw) postal code carries all of its digits.
pub fn is_complete_cep(value: &str) -> bool {
    only_digits(value).len() == CEP_DIGITS
}

/// Digits are read as cents: `"500"` becomes `"5,00"`, `"500000"` becomes
/// `"5.000,00"`. Works on the digit string directly so any length is fine.
pub fn format_currency(value: &str) -> String {
    let v = only_digits(value);
    if v.is_empty() {
        return String::new();
    }

    let significant = v.trim_start_matches('0');
    let padded = format!("{:0>3}", significant);
    let (units, cents) = padded.split_at(padded.len() - 2);
    format!("{},{}", group_thousands(units), cents)
}

fn group_thousands(units: &str) -> String {
    let len = units.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in units.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Applies the mask declared for `kind`. Dates and free text pass through.
pub fn format_for(kind: FieldKind, raw: &str) -> String {
    match kind {
        FieldKind::TaxId => format_tax_id(raw),
        FieldKind::Phone => format_phone(raw),
        FieldKind::NationalId => format_rg(raw),
        FieldKind::PostalCode => format_cep(raw),
        FieldKind::Currency => format_currency(raw),
        FieldKind::Date | FieldKind::Text => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGITS: &str = "12345678901234";

    #[test]
    fn tax_id_formats_partial_cpf() {
        assert_eq!(format_tax_id(""), "");
        assert_eq!(format_tax_id("123"), "123");
        assert_eq!(format_tax_id("1234"), "123.4");
        assert_eq!(format_tax_id("1234567"), "123.456.7");
        assert_eq!(format_tax_id("123456789"), "123.456.789");
        assert_eq!(format_tax_id("1234567890"), "123.456.789-0");
        assert_eq!(format_tax_id("12345678901"), "123.456.789-01");
    }

    #[test]
    fn tax_id_formats_cnpj() {
        assert_eq!(format_tax_id("123456789012"), "12.345.678/9012");
        assert_eq!(format_tax_id("1234567890123"), "12.345.678/9012-3");
        assert_eq!(format_tax_id("12345678000195"), "12.345.678/0001-95");
        assert_eq!(format_tax_id("12.345.678/0001-95999"), "12.345.678/0001-95");
    }

    #[test]
    fn tax_id_keeps_digits_in_order_for_every_length() {
        for n in 0..=DIGITS.len() {
            let input = &DIGITS[..n];
            let out = format_tax_id(input);
            assert_eq!(only_digits(&out), input, "length {n}");
            if n <= 11 {
                assert!(out.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-'));
                let full = "000.000.000-00";
                assert!(out.len() <= full.len());
            } else {
                assert!(out.chars().all(|c| c.is_ascii_digit() || ".-/".contains(c)));
                assert!(out.len() <= CNPJ_MAX_LEN);
            }
        }
    }

    #[test]
    fn tax_id_strips_garbage() {
        assert_eq!(format_tax_id("abc123.456-789xx01"), "123.456.789-01");
    }

    #[test]
    fn phone_mask() {
        assert_eq!(format_phone("11"), "11");
        assert_eq!(format_phone("119"), "(11) 9");
        assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
        assert_eq!(format_phone("1198765432199"), "(11) 98765-4321");
    }

    #[test]
    fn phone_mask_misplaces_dash_for_landlines() {
        // eight-digit local numbers keep the mobile layout
        assert_eq!(format_phone("1133334444"), "(11) 33334-444");
    }

    #[test]
    fn rg_mask() {
        assert_eq!(format_rg("12"), "12");
        assert_eq!(format_rg("123456789"), "12.345.678-9");
        assert_eq!(format_rg("1234567890"), "12.345.678-9");
        assert!(format_rg("123456789012345").chars().count() <= RG_MAX_LEN);
    }

    #[test]
    fn cep_mask() {
        assert_eq!(format_cep("01310"), "01310");
        assert_eq!(format_cep("013101"), "01310-1");
        assert_eq!(format_cep("01310100"), "01310-100");
        assert_eq!(format_cep("0131010099"), "01310-100");
        assert!(is_complete_cep("01310-100"));
        assert!(!is_complete_cep("01310-10"));
    }

    #[test]
    fn cep_never_exceeds_nine_chars() {
        for n in 0..20 {
            let raw: String = "9".repeat(n);
            assert!(format_cep(&raw).chars().count() <= CEP_MAX_LEN);
        }
    }

    #[test]
    fn currency_mask() {
        assert_eq!(format_currency(""), "");
        assert_eq!(format_currency("abc"), "");
        assert_eq!(format_currency("5"), "0,05");
        assert_eq!(format_currency("500"), "5,00");
        assert_eq!(format_currency("500000"), "5.000,00");
        assert_eq!(format_currency("123456789"), "1.234.567,89");
        assert_eq!(format_currency("000"), "0,00");
    }

    #[test]
    fn currency_is_stable_on_its_own_output() {
        let once = format_currency("500000");
        assert_eq!(format_currency(&once), once);
        // typing one more digit shifts the value left
        assert_eq!(format_currency(&format!("{once}1")), "50.000,01");
    }

    #[test]
    fn dispatch_by_kind() {
        assert_eq!(format_for(FieldKind::Text, "Rua Doc 12"), "Rua Doc 12");
        assert_eq!(format_for(FieldKind::PostalCode, "01310100"), "01310-100");
        assert_eq!(format_for(FieldKind::Date, "2026-10-16"), "2026-10-16");
    }
}
