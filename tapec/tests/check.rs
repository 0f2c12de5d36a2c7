use tapec::{compile, Category, Diagnostic, Error};

fn diagnose(code: &str) -> Vec<Diagnostic> {
    let diags = match compile(code) {
        Ok(_) => vec![],
        Err(diags) => diags,
    };
    for diag in &diags {
        println!("{} {}[{}]: {}", diag.pos, diag.severity, diag.category(), diag);
    }
    diags
}

macro_rules! ok {
    ($name:ident, $code:expr) => {
        #[test]
        fn $name() {
            let diags = diagnose($code);
            assert!(diags.is_empty(), "{:?}", diags);
        }
    };
}

macro_rules! fail {
    ($name:ident, $code:expr, $category:expr, $pat:pat) => {
        #[test]
        fn $name() {
            let diags = diagnose($code);
            assert!(
                diags
                    .iter()
                    .any(|d| d.is_error() && d.category() == $category && matches!(d.error, $pat)),
                "{:?}",
                diags
            );
        }
    };
}

// Scoping
ok!(shadow_in_block, "func f() { u8 x = 1; { u8 x = 2; x; } x; } f();");
ok!(shadow_nested, "func f() { u8 x; { u8 x; { u8 x; } } } f();");
ok!(shadow_param, "func f(u8 x) { { u8 x = x; } } f(1);");
ok!(sibling_blocks, "func f() { { u8 y; } { u8 y; } } f();");
fail!(redeclare, "func f() { u8 x; u8 x; }", Category::Semantic, Error::DuplicateLocal(_));
ok!(body_shadows_param, "func f(u8 x) { u8 x = 2; } f(1);");
fail!(out_of_scope, "func f() { { u8 y; } y; }", Category::Semantic, Error::UnknownVariable(_));
fail!(global_unknown, "x = 1;", Category::Semantic, Error::UnknownVariable(_));
fail!(void_local, "void v;", Category::Semantic, Error::VoidVariable(_));

// Overloads
ok!(
    overloads,
    "func f(u8 a) -> u8 { a }
     func f(u8 a, u8 b) -> u8 { a + b }
     func f() -> u8 { 0 }
     f(1); f(1, 2); f();"
);
ok!(
    overload_by_struct,
    "type P { u8 x } type Q { u8 x }
     func g(P p) -> u8 { p.x }
     func g(Q q) -> u8 { q.x }
     P p; Q q; g(p) + g(q);"
);
ok!(
    overload_pair,
    "func f(u8 a) { } func f(u8 a, u8 b) { } f(1); f(1, 2);"
);
fail!(
    overload_pair_empty,
    "func f(u8 a) { } func f(u8 a, u8 b) { } f();",
    Category::Semantic,
    Error::NoMatchingSignature(_)
);
fail!(no_overload, "func f(u8 a) { } f(1, 2);", Category::Semantic, Error::NoMatchingSignature(_));
fail!(unknown_function, "g();", Category::Semantic, Error::UnknownFunction(_));
fail!(
    duplicate_function,
    "func f(u8 a) { } func f(u8 b) { }",
    Category::Binding,
    Error::DuplicateFunction(_)
);
fail!(duplicate_param, "func f(u8 a, u8 a) { }", Category::Binding, Error::DuplicateField(..));
fail!(void_param, "func f(void a) { }", Category::Binding, Error::VoidField(_));

// Structs
ok!(nested_struct, "type P { u8 x, y } type R { P a, b } R r; r.b.y = 3; r.a = r.b;");
fail!(unknown_type, "func f(Q q) { }", Category::Binding, Error::UnknownType(_));
fail!(recursive_struct, "type A { B b } type B { A a }", Category::Binding, Error::RecursiveStruct(_));
fail!(duplicate_struct, "type A { u8 x } type A { u8 y }", Category::Binding, Error::DuplicateStruct(_));
fail!(duplicate_field, "type A { u8 x, x }", Category::Binding, Error::DuplicateField(..));
fail!(no_field, "type P { u8 x } P p; p.y;", Category::Semantic, Error::NoSuchField(..));
fail!(field_of_u8, "u8 a; a.x;", Category::Semantic, Error::NoSuchField(..));

// Types
fail!(struct_operand, "type P { u8 x } P p; p + 1;", Category::Semantic, Error::OperandType(..));
fail!(struct_condition, "type P { u8 x } func f(P p) { while p { } }", Category::Semantic, Error::ConditionType(_));
fail!(assign_mismatch, "type P { u8 x } P p = 1;", Category::Semantic, Error::MismatchedAssign(..));
fail!(assign_rvalue, "1 = 2;", Category::Semantic, Error::InvalidLValue);
fail!(bad_cast, "type P { u8 x } P p; p as u8;", Category::Semantic, Error::InvalidCast(..));
ok!(same_cast, "type P { u8 x } P p; p as P; 3 as u8;");
fail!(void_argument, "func f() { } asm(f()) -> void { };", Category::Semantic, Error::VoidArgument);
fail!(unbalanced_pointer, "asm() -> void { > };", Category::Semantic, Error::UnbalancedPointer(1));
fail!(loop_drift, "asm() -> void { [>] };", Category::Semantic, Error::UnbalancedPointer(1));

// Returns
ok!(tail_return, "func f() -> u8 { 1 } f();");
ok!(both_branches, "func f(u8 c) -> u8 { if c return 1; else return 2; } f(0);");
ok!(void_tail, "func f() { 1 } f();");
fail!(missing_return, "func f() -> u8 { }", Category::Semantic, Error::MissingReturn(..));
fail!(
    if_without_else,
    "func f() -> u8 { if (1) { return 0 } } f();",
    Category::Semantic,
    Error::MissingReturn(..)
);
ok!(if_with_else, "func f() -> u8 { if (1) { return 0 } else { return 1 } } f();");
fail!(one_branch, "func f(u8 c) -> u8 { if c return 1; }", Category::Semantic, Error::MissingReturn(..));
fail!(loop_return, "func f(u8 c) -> u8 { while c return 1; }", Category::Semantic, Error::MissingReturn(..));
fail!(wrong_return, "type P { u8 x } func f(P p) -> u8 { return p; }", Category::Semantic, Error::ReturnType(..));
fail!(value_in_void, "func f() { return 1; }", Category::Semantic, Error::ReturnType(..));
fail!(empty_in_value, "func f() -> u8 { return; }", Category::Semantic, Error::ReturnType(..));

// Call graph
fail!(self_recursion, "func f() { f(); } f();", Category::Binding, Error::RecursiveCall(_));
fail!(
    mutual_recursion,
    "func f(u8 a) { g(); } func g() { f(1); } g();",
    Category::Binding,
    Error::RecursiveCall(_)
);

// Lexical and range
fail!(bad_char, "u8 x = 1 $ 2;", Category::Lexical, Error::UnknownCharacter(_));
fail!(huge_number, "99999999999999999999;", Category::Lexical, Error::InvalidNumber(_));
fail!(overflow, "u8 x = 300;", Category::ConstantRange, Error::LiteralOverflow(300));

#[test]
fn cycle_message() {
    let diags = diagnose("func f(u8 a) { g(); } func g() { f(1); } g();");
    let cycles: Vec<String> = diags
        .iter()
        .filter(|d| matches!(d.error, Error::RecursiveCall(_)))
        .map(|d| d.to_string())
        .collect();
    assert_eq!(cycles.len(), 1);
    assert!(cycles[0].contains("f(u8) -> g() -> f(u8)"), "{}", cycles[0]);
}

#[test]
fn duplicate_has_note() {
    let diags = diagnose("func f(u8 a) { }\nfunc f(u8 b) { }");
    assert_eq!(diags.len(), 2);
    assert!(diags[0].is_error());
    assert_eq!(diags[0].pos.row, 2);
    assert!(!diags[1].is_error());
    assert_eq!(diags[1].pos.row, 1);
}

#[test]
fn errors_accumulate() {
    let diags = diagnose("func f() { a; b; } func g() -> u8 { }");
    let errors = diags.iter().filter(|d| d.is_error()).count();
    assert_eq!(errors, 3);
}

#[test]
fn failed_initializer_keeps_declaration_errors() {
    let diags = diagnose("func f() { u8 x; u8 x = y; }");
    assert!(diags.iter().any(|d| matches!(d.error, Error::DuplicateLocal(_))), "{:?}", diags);
    assert!(diags.iter().any(|d| matches!(d.error, Error::UnknownVariable(_))), "{:?}", diags);
}
