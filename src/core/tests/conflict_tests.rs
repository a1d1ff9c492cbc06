use std::collections::HashMap;

use crate::core::conflict::{
    edit_comment, BindSource, ConflictChecker, EditBlock, EditSession, Origin, PendingEditStack,
    Submission, SubmitError,
};
use crate::core::parser::{collect_variables, parse_bind_line, parse_binds};
use crate::core::types::UnbindTarget;

const STAMP: &str = "2025-10-16 12:00:00";

fn no_vars() -> HashMap<String, String> {
    HashMap::new()
}

fn origin(source: BindSource, line_number: usize) -> Origin {
    Origin { source, line_number }
}

#[test]
fn test_no_conflict_when_empty() {
    let vars = no_vars();
    let checker = ConflictChecker::new(&[], &[], &vars);
    let candidate = parse_bind_line("bind = SUPER, Q, exec, kitty").unwrap();

    assert!(checker
        .check_conflict(&candidate, None, &PendingEditStack::new())
        .is_none());
}

#[test]
fn test_latest_match_wins() {
    let base = parse_binds(
        "bind = SUPER, Q, exec, first\nbind = SUPER, W, exec, other\nbind = SUPER, Q, exec, second\n",
    );
    let vars = no_vars();
    let checker = ConflictChecker::new(&[], &base, &vars);
    let candidate = parse_bind_line("bind = SUPER, Q, exec, kitty").unwrap();

    let found = checker
        .check_conflict(&candidate, None, &PendingEditStack::new())
        .unwrap();

    assert_eq!(found.origin, origin(BindSource::Base, 3));
    assert_eq!(found.bind.rest.as_deref(), Some("exec, second"));
}

#[test]
fn test_overlay_checked_before_base() {
    let overlay = parse_binds("bind = SUPER, Q, exec, foo\n");
    let base = parse_binds("bind = SUPER, Q, exec, base\nbind = SUPER, Q, exec, base2\n");
    let vars = no_vars();
    let checker = ConflictChecker::new(&overlay, &base, &vars);
    let candidate = parse_bind_line("bind = SUPER, Q, exec, bar").unwrap();

    let found = checker
        .check_conflict(&candidate, None, &PendingEditStack::new())
        .unwrap();

    assert_eq!(found.origin.source, BindSource::Overlay);
}

#[test]
fn test_normalised_comparison() {
    let base = parse_binds("$mainMod = SUPER\nbind = $mainMod SHIFT, q, exec, foo\n");
    let vars = crate::core::parser::collect_variables("$mainMod = SUPER\n");
    let checker = ConflictChecker::new(&[], &base, &vars);
    let candidate = parse_bind_line("bind = shift_super, Q, exec, bar").unwrap();

    assert!(checker
        .check_conflict(&candidate, None, &PendingEditStack::new())
        .is_some());
}

#[test]
fn test_pending_unbind_suppresses_conflict() {
    let base = parse_binds("bind = SUPER, Q, exec, foo\n");
    let vars = no_vars();
    let checker = ConflictChecker::new(&[], &base, &vars);
    let candidate = parse_bind_line("bind = SUPER, Q, exec, bar").unwrap();

    let mut stack = PendingEditStack::new();
    stack.push_front(EditBlock {
        comment: edit_comment(STAMP),
        unbind: Some(UnbindTarget::new("SUPER", "Q")),
        line: parse_bind_line("bind = SUPER, W, exec, foo").unwrap(),
    });

    assert!(checker.check_conflict(&candidate, None, &stack).is_none());
}

#[test]
fn test_edited_line_is_not_its_own_conflict() {
    let base = parse_binds("bind = SUPER, Q, exec, foo\n");
    let vars = no_vars();
    let checker = ConflictChecker::new(&[], &base, &vars);
    let candidate = parse_bind_line("bind = SUPER, Q, exec, bar").unwrap();
    let editing = origin(BindSource::Base, 1);

    assert!(checker
        .check_conflict(&candidate, Some(&editing), &PendingEditStack::new())
        .is_none());
}

#[test]
fn test_overlay_unbind_hides_earlier_binds() {
    let overlay = parse_binds("bind = SUPER, Q, exec, old\nunbind = SUPER, Q\n");
    let base = parse_binds("bind = SUPER, Q, exec, base\n");
    let vars = no_vars();
    let checker = ConflictChecker::new(&overlay, &base, &vars);
    let candidate = parse_bind_line("bind = SUPER, Q, exec, new").unwrap();

    assert!(checker
        .check_conflict(&candidate, None, &PendingEditStack::new())
        .is_none());
}

#[test]
fn test_stack_prepends_most_recent_first() {
    let mut stack = PendingEditStack::new();
    for key in ["A", "B"] {
        stack.push_front(EditBlock {
            comment: edit_comment(STAMP),
            unbind: None,
            line: parse_bind_line(&format!("bind = SUPER, {}, exec, x", key)).unwrap(),
        });
    }

    let keys: Vec<_> = stack.iter().map(|b| b.line.key.clone()).collect();
    assert_eq!(keys, vec!["B", "A"]);
    assert!(!stack.unbinds(&UnbindTarget::new("SUPER", "A")));
}

#[test]
fn test_create_on_empty_overlay() {
    let vars = no_vars();
    let checker = ConflictChecker::new(&[], &[], &vars);
    let mut session = EditSession::create();

    let plan = match session.submit("bindd = SUPER, Q, exec, kitty", &checker).unwrap() {
        Submission::Clean(plan) => plan,
        other => panic!("expected clean submission, got {:?}", other),
    };

    let rendered = plan.render("", STAMP);
    assert_eq!(
        rendered,
        format!("{}\nbind = SUPER, Q, exec, kitty\n", edit_comment(STAMP))
    );
}

#[test]
fn test_overwrite_unbinds_conflict_before_bind() {
    let overlay_text = "bind = SUPER, Q, exec, foo\n";
    let overlay = parse_binds(overlay_text);
    let base = parse_binds("bind = SUPER, Q, exec, kitty\n");
    let vars = no_vars();
    let checker = ConflictChecker::new(&overlay, &base, &vars);

    let mut session = EditSession::edit(origin(BindSource::Base, 1), base[0].bind.clone());
    let outcome = session.submit("bind = SUPER, Q, exec, bar", &checker).unwrap();

    match outcome {
        Submission::Conflict(found) => assert_eq!(found.origin, origin(BindSource::Overlay, 1)),
        other => panic!("expected conflict, got {:?}", other),
    }

    let plan = session.overwrite().unwrap();
    let rendered = plan.render(overlay_text, STAMP);

    let expected = format!(
        "bind = SUPER, Q, exec, foo\n\n{}\nunbind = SUPER, Q\nbind = SUPER, Q, exec, bar\n",
        edit_comment(STAMP)
    );
    assert_eq!(rendered, expected);
}

#[test]
fn test_edit_conflict_builds_stack() {
    let base_text = "bind = SUPER, Q, exec, a\nbind = SUPER, W, exec, b\n";
    let base = parse_binds(base_text);
    let vars = no_vars();
    let checker = ConflictChecker::new(&[], &base, &vars);

    // Move SUPER+Q onto SUPER+W, which is taken
    let mut session = EditSession::edit(origin(BindSource::Base, 1), base[0].bind.clone());
    let outcome = session.submit("bind = SUPER, W, exec, a", &checker).unwrap();
    assert!(matches!(outcome, Submission::Conflict(_)));

    let seed = session.edit_conflict(STAMP).unwrap();
    assert_eq!(seed, "bind = SUPER, W, exec, b");
    assert_eq!(session.stack().len(), 1);
    assert_eq!(session.origin(), Some(&origin(BindSource::Base, 2)));

    // Move the old SUPER+W to SUPER+Q: SUPER+Q is already scheduled for unbind
    let plan = match session.submit("bind = SUPER, Q, exec, b", &checker).unwrap() {
        Submission::Clean(plan) => plan,
        other => panic!("expected clean submission, got {:?}", other),
    };

    let rendered = plan.render("", STAMP);
    let comment = edit_comment(STAMP);
    let expected = format!(
        "{c}\nunbind = SUPER, W\nbind = SUPER, Q, exec, b\n{c}\nunbind = SUPER, Q\nbind = SUPER, W, exec, a\n",
        c = comment
    );
    assert_eq!(rendered, expected);
}

#[test]
fn test_retry_returns_candidate() {
    let base = parse_binds("bind = SUPER, Q, exec, a\n");
    let vars = no_vars();
    let checker = ConflictChecker::new(&[], &base, &vars);

    let mut session = EditSession::create();
    session.submit("bind = SUPER, Q, exec, b", &checker).unwrap();

    assert!(session.awaiting().is_some());
    assert_eq!(session.retry().as_deref(), Some("bind = SUPER, Q, exec, b"));
    assert!(session.awaiting().is_none());
    assert!(session.overwrite().is_none(), "nothing left to overwrite");
}

#[test]
fn test_submit_rejects_unbind_and_garbage() {
    let vars = no_vars();
    let checker = ConflictChecker::new(&[], &[], &vars);
    let mut session = EditSession::create();

    assert_eq!(
        session.submit("unbind = SUPER, Q", &checker),
        Err(SubmitError::NotABind)
    );
    assert!(matches!(
        session.submit("nonsense", &checker),
        Err(SubmitError::Parse(_))
    ));
}

#[test]
fn test_conflict_through_underscored_variable() {
    let content = "$main_mod = SUPER\nbind = $main_mod, Q, killactive,\n";
    let base = parse_binds(content);
    let vars = collect_variables(content);
    let checker = ConflictChecker::new(&[], &base, &vars);
    let candidate = parse_bind_line("bind = SUPER, Q, exec, kitty").unwrap();

    let found = checker
        .check_conflict(&candidate, None, &PendingEditStack::new())
        .unwrap();

    assert_eq!(found.origin, origin(BindSource::Base, 2));
}
