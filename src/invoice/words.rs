//! Amount-in-words conversion using the Indian numbering system.
//!
//! Bands are crore (1,00,00,000), lakh (1,00,000), thousand, hundred.
//! A band whose value is zero contributes nothing, so 1,00,000 spells
//! "One Lakh", never "One Lakh Zero Thousand".

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Spell a value below one hundred. Zero spells as the empty string so
/// callers can skip empty bands.
fn below_hundred(n: u64) -> String {
    debug_assert!(n < 100);
    if n < 20 {
        ONES[n as usize].to_string()
    } else if n % 10 == 0 {
        TENS[(n / 10) as usize].to_string()
    } else {
        format!("{} {}", TENS[(n / 10) as usize], ONES[(n % 10) as usize])
    }
}

/// Spell a value below one thousand.
fn below_thousand(n: u64) -> String {
    debug_assert!(n < 1000);
    let hundreds = n / 100;
    let rest = n % 100;
    match (hundreds, rest) {
        (0, r) => below_hundred(r),
        (h, 0) => format!("{} Hundred", ONES[h as usize]),
        (h, r) => format!("{} Hundred {}", ONES[h as usize], below_hundred(r)),
    }
}

/// Spell a non-negative integer in the Indian numbering system.
/// `0` maps to the literal word "Zero".
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }

    let mut parts: Vec<String> = Vec::new();

    let crore = n / 10_000_000;
    if crore > 0 {
        // Values of 100 crore and above recurse ("One Hundred Crore").
        parts.push(format!("{} Crore", number_to_words(crore)));
    }

    let lakh = (n / 100_000) % 100;
    if lakh > 0 {
        parts.push(format!("{} Lakh", below_hundred(lakh)));
    }

    let thousand = (n / 1_000) % 100;
    if thousand > 0 {
        parts.push(format!("{} Thousand", below_hundred(thousand)));
    }

    let rest = n % 1_000;
    if rest > 0 {
        parts.push(below_thousand(rest));
    }

    parts.join(" ")
}

/// Currency display form: the spelled amount suffixed with " Only".
/// Negative totals never occur in practice; they clamp to zero.
pub fn amount_in_words(amount: i64) -> String {
    let n = u64::try_from(amount).unwrap_or(0);
    format!("{} Only", number_to_words(n))
}
