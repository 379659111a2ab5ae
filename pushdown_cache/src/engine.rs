//! Parsing of the table-level `engine` option into a [`TableEngine`].

use remote_types::{RemoteName, TableEngine};

use crate::{interface::DeclaredOption, ConfigError};

/// Remote engine whose rows carry a +1/-1 version marker.
const COLLAPSING_ENGINE: &str = "collapsingmergetree";

/// Sign column assumed when the engine declaration names none.
const DEFAULT_SIGN_FIELD: &str = "sign";

/// Find the `engine` option among a table's declared options and classify
/// it. Options are processed in declaration order; a later `engine` option
/// overrides an earlier one.
pub(crate) fn engine_from_options(options: &[DeclaredOption]) -> Result<TableEngine, ConfigError> {
    let mut engine = TableEngine::Usual;
    for option in options {
        if option.name == "engine" {
            engine = classify_engine(&option.value)?;
        }
    }
    Ok(engine)
}

/// Classify one `engine` option value.
///
/// The grammar is `<name>` or `<name>(<arg>)`, where `<name>` is matched
/// case-insensitively by prefix and `<arg>` names the sign column. Absent,
/// unmatched, or empty parentheses fall back to [`DEFAULT_SIGN_FIELD`].
/// Unrecognized engine names are not an error; they must never break
/// planning for tables outside this extension's concern.
fn classify_engine(value: &str) -> Result<TableEngine, ConfigError> {
    let is_collapsing = value
        .get(..COLLAPSING_ENGINE.len())
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case(COLLAPSING_ENGINE));
    if !is_collapsing {
        return Ok(TableEngine::Usual);
    }

    let arg = match (value.find('('), value.rfind(')')) {
        (Some(start), Some(end)) if start < end => value[start + 1..end].trim(),
        _ => "",
    };

    let sign_field = if arg.is_empty() {
        RemoteName::try_new(DEFAULT_SIGN_FIELD).expect("default sign field is a valid name")
    } else {
        RemoteName::try_new(arg).map_err(|source| ConfigError::Engine {
            value: value.to_owned(),
            source,
        })?
    };

    Ok(TableEngine::CollapsingVersioned { sign_field })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use remote_types::{NameError, MAX_REMOTE_NAME_LEN};

    use super::*;

    #[track_caller]
    fn classify(value: &str) -> TableEngine {
        engine_from_options(&[DeclaredOption::new("engine", value)]).unwrap()
    }

    #[test]
    fn bare_collapsing_engine_defaults_sign_field() {
        assert_matches!(
            classify("CollapsingMergeTree"),
            TableEngine::CollapsingVersioned { sign_field } if sign_field.as_str() == "sign"
        );
    }

    #[test]
    fn parenthesized_argument_names_sign_field() {
        assert_matches!(
            classify("CollapsingMergeTree(version)"),
            TableEngine::CollapsingVersioned { sign_field } if sign_field.as_str() == "version"
        );
    }

    #[test]
    fn empty_parentheses_treated_as_absent() {
        assert_matches!(
            classify("CollapsingMergeTree()"),
            TableEngine::CollapsingVersioned { sign_field } if sign_field.as_str() == "sign"
        );
        // Whitespace-only argument, same story.
        assert_matches!(
            classify("CollapsingMergeTree(  )"),
            TableEngine::CollapsingVersioned { sign_field } if sign_field.as_str() == "sign"
        );
    }

    #[test]
    fn overlong_argument_is_a_configuration_error() {
        let value = format!("CollapsingMergeTree({})", "x".repeat(MAX_REMOTE_NAME_LEN + 1));
        assert_matches!(
            engine_from_options(&[DeclaredOption::new("engine", &*value)]),
            Err(ConfigError::Engine {
                source: NameError::TooLong(_),
                ..
            })
        );
    }

    #[test]
    fn unrecognized_engine_stays_usual() {
        assert_matches!(classify("MergeTree"), TableEngine::Usual);
        assert_matches!(classify("ReplacingMergeTree(ver)"), TableEngine::Usual);
    }

    #[test]
    fn engine_name_match_is_case_insensitive() {
        assert_matches!(
            classify("COLLAPSINGMERGETREE(sgn)"),
            TableEngine::CollapsingVersioned { sign_field } if sign_field.as_str() == "sgn"
        );
    }

    #[test]
    fn argument_is_trimmed() {
        assert_matches!(
            classify("CollapsingMergeTree( version )"),
            TableEngine::CollapsingVersioned { sign_field } if sign_field.as_str() == "version"
        );
    }

    #[test]
    fn unmatched_parenthesis_falls_back_to_default() {
        assert_matches!(
            classify("CollapsingMergeTree(version"),
            TableEngine::CollapsingVersioned { sign_field } if sign_field.as_str() == "sign"
        );
    }

    #[test]
    fn last_engine_option_wins() {
        let options = [
            DeclaredOption::new("engine", "MergeTree"),
            DeclaredOption::new("database", "default"),
            DeclaredOption::new("engine", "CollapsingMergeTree(version)"),
        ];
        assert_matches!(
            engine_from_options(&options).unwrap(),
            TableEngine::CollapsingVersioned { sign_field } if sign_field.as_str() == "version"
        );
    }

    #[test]
    fn no_engine_option_stays_usual() {
        assert_matches!(
            engine_from_options(&[DeclaredOption::new("database", "default")]).unwrap(),
            TableEngine::Usual
        );
        assert_matches!(engine_from_options(&[]).unwrap(), TableEngine::Usual);
    }
}
