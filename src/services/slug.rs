// src/services/slug.rs
// DOCUMENTATION: Vietnamese-aware text folding
// PURPOSE: URL slugs and accent-insensitive name matching

/// Lowercase and strip Vietnamese tone and vowel marks ("Chợ Đầm" -> "cho dam")
pub fn fold_diacritics(input: &str) -> String {
    input
        .to_lowercase()
        .chars()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .map(fold_char)
        .collect()
}

fn fold_char(c: char) -> char {
    match c {
        'à' | 'á' | 'ạ' | 'ả' | 'ã' | 'â' | 'ầ' | 'ấ' | 'ậ' | 'ẩ' | 'ẫ' | 'ă' | 'ằ' | 'ắ'
        | 'ặ' | 'ẳ' | 'ẵ' => 'a',
        'è' | 'é' | 'ẹ' | 'ẻ' | 'ẽ' | 'ê' | 'ề' | 'ế' | 'ệ' | 'ể' | 'ễ' => 'e',
        'ì' | 'í' | 'ị' | 'ỉ' | 'ĩ' => 'i',
        'ò' | 'ó' | 'ọ' | 'ỏ' | 'õ' | 'ô' | 'ồ' | 'ố' | 'ộ' | 'ổ' | 'ỗ' | 'ơ' | 'ờ' | 'ớ'
        | 'ợ' | 'ở' | 'ỡ' => 'o',
        'ù' | 'ú' | 'ụ' | 'ủ' | 'ũ' | 'ư' | 'ừ' | 'ứ' | 'ự' | 'ử' | 'ữ' => 'u',
        'ỳ' | 'ý' | 'ỵ' | 'ỷ' | 'ỹ' => 'y',
        'đ' => 'd',
        other => other,
    }
}

/// Fold and collapse every run of non-alphanumerics into a single space
pub fn normalize_name(input: &str) -> String {
    fold_diacritics(input)
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// URL slug: ASCII, lowercase, hyphen separated, at most 200 chars
pub fn slugify(input: &str) -> String {
    let mut slug = normalize_name(input).replace(' ', "-");
    if slug.len() > 200 {
        slug.truncate(200);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// `base`, or `base-N` with the smallest N >= 2 not already in `taken`
pub fn next_free_slug(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|t| t == base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_vietnamese() {
        assert_eq!(fold_diacritics("Chợ Đầm"), "cho dam");
        assert_eq!(fold_diacritics("Tháp Bà Ponagar"), "thap ba ponagar");
        assert_eq!(fold_diacritics("Hòn Chồng"), "hon chong");
    }

    #[test]
    fn test_fold_decomposed_marks() {
        // "ệ" written as e + circumflex + dot below
        assert_eq!(fold_diacritics("Vie\u{0302}\u{0323}t"), "viet");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Bãi biển Trần Phú"), "bai-bien-tran-phu");
        assert_eq!(slugify("  Lạc Cảnh -- BBQ & Bia! "), "lac-canh-bbq-bia");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Nha  Trang, Việt Nam"), "nha trang viet nam");
    }

    #[test]
    fn test_next_free_slug() {
        let taken = vec!["cho-dam".to_string(), "cho-dam-2".to_string()];
        assert_eq!(next_free_slug("cho-dam", &taken), "cho-dam-3");
        assert_eq!(next_free_slug("hon-chong", &taken), "hon-chong");
        assert_eq!(next_free_slug("cho-dam", &[]), "cho-dam");
    }
}
