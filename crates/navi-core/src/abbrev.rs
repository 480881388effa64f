//! Name abbreviation for type and frame descriptors
//!
//! Qualified names are long (`Ljava/util/concurrent/ConcurrentHashMap;`), so
//! every package segment is cropped to its first character for display. The
//! unabridged string always travels alongside the cropped one in
//! [`Abbreviated`], so nothing is lost by abbreviating.

use serde::Serialize;

/// A display string paired with the original it was cropped from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Abbreviated {
    /// Cropped text shown by default
    pub display: String,
    /// Unabridged text, shown on disclosure
    pub original: String,
}

impl Abbreviated {
    /// Abbreviate a type descriptor (`[Ljava/lang/String;`)
    pub fn jni(descriptor: impl Into<String>) -> Self {
        let original = descriptor.into();
        Self {
            display: crop_jni(&original),
            original,
        }
    }

    /// Abbreviate a frame descriptor (`com/foo/Bar.baz(I)V:42`)
    pub fn function(descriptor: impl Into<String>) -> Self {
        let original = descriptor.into();
        Self {
            display: crop_fjni(&original),
            original,
        }
    }

    /// The text to show, honouring full-name disclosure
    pub fn text(&self, full_names: bool) -> &str {
        if full_names {
            &self.original
        } else {
            &self.display
        }
    }

    /// Whether cropping changed anything
    pub fn is_cropped(&self) -> bool {
        self.display != self.original
    }
}

/// Crop a qualified name: `com/foo/Bar` and `com.foo.Bar` become `c.f.Bar`.
pub fn crop_pkg(qualified: &str) -> String {
    let segments: Vec<&str> = qualified.split(['/', '.']).collect();
    let Some((last, packages)) = segments.split_last() else {
        return String::new();
    };

    let mut tokens: Vec<&str> = packages
        .iter()
        .map(|&segment| match segment.chars().next() {
            Some(first) => &segment[..first.len_utf8()],
            None => "",
        })
        .collect();
    tokens.push(*last);
    tokens.join(".")
}

/// Crop a type descriptor.
///
/// Each leading `[` becomes a trailing `[]`, `L<name>;` is cropped with
/// [`crop_pkg`], and primitive descriptors pass through.
pub fn crop_jni(descriptor: &str) -> String {
    if let Some(element) = descriptor.strip_prefix('[') {
        return format!("{}[]", crop_jni(element));
    }
    if let Some(name) = descriptor.strip_prefix('L') {
        return crop_pkg(name.strip_suffix(';').unwrap_or(name));
    }
    descriptor.to_string()
}

/// Crop a frame descriptor, keeping a trailing `:<line>` when present.
///
/// The method name stays whole: `com/foo/Bar.baz(I)V:42` is `c.f.Bar.baz:42`.
pub fn crop_fjni(descriptor: &str) -> String {
    let qualified = descriptor.split('(').next().unwrap_or_default();
    let method = match qualified.rsplit_once('.') {
        Some((class, method)) => format!("{}.{}", crop_pkg(class), method),
        None => crop_pkg(qualified),
    };

    match descriptor.split(':').nth(1).filter(|line| !line.is_empty()) {
        Some(line) => format!("{}:{}", method, line),
        None => method,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_pkg_slashes_and_dots() {
        assert_eq!(crop_pkg("com/foo/Bar"), "c.f.Bar");
        assert_eq!(crop_pkg("com.foo.Bar"), "c.f.Bar");
        assert_eq!(crop_pkg("java/util.HashMap"), "j.u.HashMap");
    }

    #[test]
    fn test_crop_pkg_single_segment() {
        assert_eq!(crop_pkg("Bar"), "Bar");
        assert_eq!(crop_pkg(""), "");
    }

    #[test]
    fn test_crop_pkg_token_property() {
        let inputs = [
            "a/b/c/D",
            "android.os.Looper.loop",
            "com/example/app/MainActivity$1",
            "x.Y",
        ];
        for input in inputs {
            let segments: Vec<&str> = input.split(['/', '.']).collect();
            let output = crop_pkg(input);
            let tokens: Vec<&str> = output.split('.').collect();

            assert_eq!(tokens.len(), segments.len(), "token count for {input}");
            for (token, segment) in tokens.iter().zip(&segments[..segments.len() - 1]) {
                assert_eq!(token.chars().count(), 1);
                assert_eq!(token.chars().next(), segment.chars().next());
            }
            assert_eq!(tokens.last(), segments.last());
        }
    }

    #[test]
    fn test_crop_pkg_multibyte_first_char() {
        assert_eq!(crop_pkg("été/Klasse"), "é.Klasse");
    }

    #[test]
    fn test_crop_jni_arrays() {
        assert_eq!(crop_jni("[I"), "I[]");
        assert_eq!(crop_jni("[[I"), "I[][]");
        assert_eq!(crop_jni("[[I"), format!("{}[]", crop_jni("[I")));
        assert_eq!(crop_jni("[Ljava/lang/String;"), "j.l.String[]");
    }

    #[test]
    fn test_crop_jni_objects_and_primitives() {
        assert_eq!(crop_jni("Ljava/lang/Object;"), "j.l.Object");
        assert_eq!(crop_jni("I"), "I");
        assert_eq!(crop_jni("Z"), "Z");
        assert_eq!(crop_jni(""), "");
    }

    #[test]
    fn test_crop_fjni_with_line() {
        assert_eq!(crop_fjni("com/foo/Bar.baz(...)V:42"), "c.f.Bar.baz:42");
    }

    #[test]
    fn test_crop_fjni_without_line() {
        assert_eq!(crop_fjni("com/foo/Bar.baz(I)V"), "c.f.Bar.baz");
        assert_eq!(crop_fjni("com/foo/Bar.baz(I)V:"), "c.f.Bar.baz");
    }

    #[test]
    fn test_abbreviated_keeps_original() {
        let abbr = Abbreviated::jni("Ljava/lang/String;");
        assert_eq!(abbr.display, "j.l.String");
        assert_eq!(abbr.original, "Ljava/lang/String;");
        assert_eq!(abbr.text(true), "Ljava/lang/String;");
        assert_eq!(abbr.text(false), "j.l.String");
        assert!(abbr.is_cropped());

        let prim = Abbreviated::jni("I");
        assert!(!prim.is_cropped());
    }

    #[test]
    fn test_abbreviated_function() {
        let abbr = Abbreviated::function("android/os/Looper.loop()V:120");
        assert_eq!(abbr.display, "a.o.Looper.loop:120");
        assert_eq!(abbr.original, "android/os/Looper.loop()V:120");
    }
}
