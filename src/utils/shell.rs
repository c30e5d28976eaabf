//! Shell quoting for generated commands

/// Quote `arg` for a POSIX shell. Arguments made only of safe characters are
/// returned unchanged so generated commands stay readable.
pub fn shell_quote(arg: &str) -> String {
    if !arg.is_empty() && arg.chars().all(is_safe) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

fn is_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_-./:=@%+,".contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_plain_words_alone() {
        assert_eq!(shell_quote("src/assets"), "src/assets");
        assert_eq!(shell_quote("/usr/bin/assetman"), "/usr/bin/assetman");
    }

    #[test]
    fn quotes_globs_and_spaces() {
        assert_eq!(shell_quote("**/*.psd"), "'**/*.psd'");
        assert_eq!(shell_quote("my assets"), "'my assets'");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }
}
