//! Suffix numbering and the per-directory collision guard.

use super::{NumberNamingTextStyle, SameNameConvention};
use crate::core::photo::NamedPhoto;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Render `number` (1-based) in `style`, padded to the width of `total`
pub(crate) fn format_number(number: usize, total: usize, style: NumberNamingTextStyle) -> String {
    match style {
        NumberNamingTextStyle::AllNamesAreSameLength => {
            let width = total.max(1).to_string().len();
            format!("{number:0width$}")
        }
        NumberNamingTextStyle::OnlySequentialNumbers => number.to_string(),
        NumberNamingTextStyle::Letters => letters(number),
    }
}

/// Bijective base-26: 1 -> a, 26 -> z, 27 -> aa
fn letters(mut number: usize) -> String {
    let mut out = Vec::new();
    while number > 0 {
        number -= 1;
        out.push(b'a' + (number % 26) as u8);
        number /= 26;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Base names for the members of one bucket, in bucket order
pub(crate) fn suffixed_names(
    key: &str,
    count: usize,
    separator: &str,
    style: NumberNamingTextStyle,
    convention: SameNameConvention,
) -> Vec<String> {
    if count == 1 {
        return vec![key.to_string()];
    }
    (1..=count)
        .map(|number| {
            if number == 1 && convention == SameNameConvention::FirstUnsuffixed {
                key.to_string()
            } else {
                format!("{key}{separator}{}", format_number(number, count, style))
            }
        })
        .collect()
}

/// Rename photos whose names clash inside their directory
///
/// Comparison is case-insensitive and covers companion names too. The
/// first claimant keeps its name; later ones get `{separator}{n}` with
/// the smallest free `n`.
pub fn ensure_unique_names(photos: &mut [NamedPhoto], separator: &str) {
    let mut taken: HashMap<String, HashSet<String>> = HashMap::new();
    let mut counters: HashMap<(String, String), usize> = HashMap::new();

    for photo in photos.iter_mut() {
        let names = taken.entry(photo.target_directory.clone()).or_default();
        if claims_free(photo, names) {
            claim(photo, names);
            continue;
        }

        let base = photo.base_name.clone();
        let counter = counters
            .entry((photo.target_directory.clone(), base.to_lowercase()))
            .or_insert(1);
        loop {
            let candidate = format!("{base}{separator}{counter}");
            *counter += 1;
            photo.rename(&candidate);
            if claims_free(photo, names) {
                break;
            }
        }
        debug!(
            directory = %photo.target_directory,
            from = %base,
            to = %photo.base_name,
            "Resolved file name collision"
        );
        claim(photo, names);
    }
}

fn claims_free(photo: &NamedPhoto, taken: &HashSet<String>) -> bool {
    std::iter::once(&photo.file_name)
        .chain(photo.companion_file_names.iter())
        .all(|name| !taken.contains(&name.to_lowercase()))
}

fn claim(photo: &NamedPhoto, taken: &mut HashSet<String>) {
    for name in std::iter::once(&photo.file_name).chain(photo.companion_file_names.iter()) {
        taken.insert(name.to_lowercase());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::photo::{IdentifiedPhoto, Photo, PhotoFile};
    use std::path::PathBuf;

    #[test]
    fn same_length_numbers_pad_to_bucket_size() {
        assert_eq!(format_number(3, 9, NumberNamingTextStyle::AllNamesAreSameLength), "3");
        assert_eq!(format_number(3, 10, NumberNamingTextStyle::AllNamesAreSameLength), "03");
        assert_eq!(format_number(7, 120, NumberNamingTextStyle::AllNamesAreSameLength), "007");
        assert_eq!(format_number(7, 120, NumberNamingTextStyle::OnlySequentialNumbers), "7");
    }

    #[test]
    fn letters_are_bijective_base_26() {
        let style = NumberNamingTextStyle::Letters;
        assert_eq!(format_number(1, 30, style), "a");
        assert_eq!(format_number(26, 30, style), "z");
        assert_eq!(format_number(27, 30, style), "aa");
        assert_eq!(format_number(52, 60, style), "az");
        assert_eq!(format_number(703, 800, style), "aaa");
    }

    #[test]
    fn singleton_bucket_is_unsuffixed() {
        let names = suffixed_names(
            "key",
            1,
            "-",
            NumberNamingTextStyle::OnlySequentialNumbers,
            SameNameConvention::NumberAll,
        );
        assert_eq!(names, vec!["key"]);
    }

    #[test]
    fn first_member_convention() {
        let style = NumberNamingTextStyle::OnlySequentialNumbers;
        assert_eq!(
            suffixed_names("k", 3, "-", style, SameNameConvention::NumberAll),
            vec!["k-1", "k-2", "k-3"]
        );
        assert_eq!(
            suffixed_names("k", 3, "-", style, SameNameConvention::FirstUnsuffixed),
            vec!["k", "k-2", "k-3"]
        );
    }

    fn named(path: &str, dir: &str, base: &str) -> NamedPhoto {
        let photo = IdentifiedPhoto::unresolved(Photo::new(PhotoFile::new(path), None));
        NamedPhoto::new(photo, dir, base)
    }

    #[test]
    fn collisions_get_counter_suffix() {
        let mut photos = vec![
            named("/x/a.jpg", "d", "IMG"),
            named("/y/a.JPG", "d", "img"),
            named("/z/a.jpg", "other", "IMG"),
            named("/w/a.jpg", "d", "IMG"),
        ];

        ensure_unique_names(&mut photos, "-");

        let names: Vec<_> = photos.iter().map(|p| p.target_relative_path()).collect();
        assert_eq!(
            names,
            vec!["d/IMG.jpg", "d/img-1.JPG", "other/IMG.jpg", "d/IMG-2.jpg"]
        );
    }

    #[test]
    fn companion_names_take_part_in_collisions() {
        let heic = IdentifiedPhoto::unresolved(Photo::new(
            PhotoFile::new("/a.heic").with_companions(vec![PathBuf::from("/a.mov")]),
            None,
        ));
        let jpg = IdentifiedPhoto::unresolved(Photo::new(
            PhotoFile::new("/b/a.jpg").with_companions(vec![PathBuf::from("/b/a.MOV")]),
            None,
        ));
        let mut photos = vec![NamedPhoto::new(heic, "", "a"), NamedPhoto::new(jpg, "", "a")];

        ensure_unique_names(&mut photos, "-");

        assert_eq!(photos[1].file_name, "a-1.jpg");
        assert_eq!(photos[1].companion_file_names, vec!["a-1.MOV"]);
    }

    #[test]
    fn counter_skips_names_already_taken() {
        let mut photos = vec![
            named("/1.jpg", "", "k"),
            named("/2.jpg", "", "k-1"),
            named("/3.jpg", "", "k"),
        ];
        ensure_unique_names(&mut photos, "-");
        assert_eq!(photos[2].file_name, "k-2.jpg");
    }
}
