//! Transaction description classifier
//!
//! Derives a spending category from a free-text description when the caller
//! supplies none. Matching is case-insensitive substring search; the first
//! rule that hits wins.

/// Static keyword rules — zero allocation
const CATEGORY_RULES: &[(&str, &[&str])] = &[
    ("Rent", &["rent"]),
    ("Food", &["swiggy", "zomato", "food"]),
    ("Transport", &["metro", "uber", "bus", "transport"]),
    ("UPI", &["upi"]),
    ("Gym", &["gym"]),
];

/// Fallback category when no rule matches
pub const FALLBACK_CATEGORY: &str = "Other";

/// Derive a category from a transaction description.
pub fn categorize(description: &str) -> &'static str {
    let d = description.to_lowercase();

    for (category, keywords) in CATEGORY_RULES {
        if keywords.iter().any(|kw| d.contains(kw)) {
            return category;
        }
    }

    FALLBACK_CATEGORY
}
