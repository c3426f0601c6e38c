//! Grouping numbered images into animations.
//!
//! Files in one directory whose names differ only in their last run of
//! digits (`walk_01.png`, `walk_02.png`, ...) form one sprite, ordered by
//! that number.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// The files of one sprite, in frame order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteSource {
    pub name: String,
    pub files: Vec<PathBuf>,
}

impl SpriteSource {
    /// A single-image sprite named after the file stem.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: stem(&path),
            files: vec![path],
        }
    }

    pub fn is_animation(&self) -> bool {
        self.files.len() > 1
    }
}

/// A file name split around its last run of digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SequenceKey {
    dir: PathBuf,
    prefix: String,
    postfix: String,
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Split `name` into prefix, number, postfix around its last digit run.
fn split_last_number(name: &str) -> Option<(&str, u64, &str)> {
    let end = name.rfind(|c: char| c.is_ascii_digit())? + 1;
    let start = name[..end]
        .char_indices()
        .rev()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let number = name[start..end].parse().ok()?;
    Some((&name[..start], number, &name[end..]))
}

/// Sequence key and frame number of `path`. Names without digits, or whose
/// digits start the name, do not take part in grouping.
fn sequence_key(path: &Path) -> Option<(SequenceKey, u64)> {
    let name = path.file_name()?.to_str()?;
    let (prefix, number, postfix) = split_last_number(name)?;
    if prefix.is_empty() {
        return None;
    }
    let key = SequenceKey {
        dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        prefix: prefix.to_string(),
        postfix: postfix.to_string(),
    };
    Some((key, number))
}

/// Sprite name of a sequence: the shared prefix without trailing separators.
fn sequence_name(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches(['_', '-', ' ', '.']);
    if trimmed.is_empty() {
        prefix.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Group `files` into sprites, keeping the order of first appearance.
///
/// With `animate` off every file is its own sprite.
pub fn group_sequences(files: &[PathBuf], animate: bool) -> Vec<SpriteSource> {
    if !animate {
        return files.iter().cloned().map(SpriteSource::single).collect();
    }

    let keyed: Vec<Option<(SequenceKey, u64)>> = files.iter().map(|f| sequence_key(f)).collect();
    let mut used = HashSet::new();
    let mut sprites = Vec::new();

    for (i, file) in files.iter().enumerate() {
        if used.contains(&i) {
            continue;
        }
        let Some((key, _)) = &keyed[i] else {
            sprites.push(SpriteSource::single(file.clone()));
            continue;
        };

        let mut members: Vec<(u64, usize)> = keyed
            .iter()
            .enumerate()
            .filter_map(|(j, k)| match k {
                Some((other, n)) if other == key && !used.contains(&j) => Some((*n, j)),
                _ => None,
            })
            .collect();
        members.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| files[a.1].cmp(&files[b.1])));

        if members.len() == 1 {
            used.insert(i);
            sprites.push(SpriteSource::single(file.clone()));
            continue;
        }

        used.extend(members.iter().map(|(_, j)| *j));
        sprites.push(SpriteSource {
            name: sequence_name(&key.prefix),
            files: members.into_iter().map(|(_, j)| files[j].clone()).collect(),
        });
    }

    sprites
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_split_last_number() {
        assert_eq!(split_last_number("walk_12.png"), Some(("walk_", 12, ".png")));
        assert_eq!(split_last_number("v2_walk_3b.png"), Some(("v2_walk_", 3, "b.png")));
        assert_eq!(split_last_number("07.png"), Some(("", 7, ".png")));
        assert_eq!(split_last_number("hero.png"), None);
    }

    #[test]
    fn test_split_last_number_after_multibyte_char() {
        assert_eq!(split_last_number("café01"), Some(("café", 1, "")));
        assert_eq!(split_last_number("héros_2.png"), Some(("héros_", 2, ".png")));
        assert_eq!(split_last_number("ß"), None);
    }

    #[test]
    fn test_groups_non_ascii_names() {
        let files = paths(&["art/café01.png", "art/café02.png"]);
        let sprites = group_sequences(&files, true);
        assert_eq!(sprites.len(), 1);
        assert_eq!(sprites[0].name, "café");
        assert_eq!(sprites[0].files.len(), 2);
    }

    #[test]
    fn test_groups_in_numeric_order() {
        let files = paths(&["art/walk_10.png", "art/walk_2.png", "art/hero.png", "art/walk_1.png"]);
        let sprites = group_sequences(&files, true);

        assert_eq!(
            sprites,
            vec![
                SpriteSource {
                    name: "walk".to_string(),
                    files: paths(&["art/walk_1.png", "art/walk_2.png", "art/walk_10.png"]),
                },
                SpriteSource::single("art/hero.png"),
            ]
        );
        assert!(sprites[0].is_animation());
    }

    #[test]
    fn test_different_dirs_or_postfix_do_not_group() {
        let files = paths(&["a/run1.png", "b/run2.png", "a/run3.jpg"]);
        let sprites = group_sequences(&files, true);
        assert_eq!(sprites.len(), 3);
        assert!(sprites.iter().all(|s| !s.is_animation()));
    }

    #[test]
    fn test_bare_numbers_do_not_group() {
        let files = paths(&["tiles/1.png", "tiles/2.png"]);
        let sprites = group_sequences(&files, true);
        assert_eq!(sprites.len(), 2);
        assert_eq!(sprites[0].name, "1");
    }

    #[test]
    fn test_animate_off() {
        let files = paths(&["walk_1.png", "walk_2.png"]);
        assert_eq!(group_sequences(&files, false).len(), 2);
    }
}
