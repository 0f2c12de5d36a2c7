use arch::{Program, State};
use tapec::compile;

const PRELUDE: &str = "
func out(u8 v) { asm(v) -> void { . } }
func in() -> u8 { asm() -> u8 { , } }
";

fn run(code: &str, input: &[u8]) -> Vec<u8> {
    let source = format!("{}{}", PRELUDE, code);
    let output = match compile(&source) {
        Ok(output) => output,
        Err(diags) => {
            for diag in &diags {
                println!("{}: {}", diag.pos, diag);
            }
            panic!("compilation failed");
        }
    };
    println!("{}", output.code);
    let program = Program::new(output.code.0.clone()).unwrap();
    let mut state = State::new(program);
    state.feed(input);
    let steps = state.run(Some(50_000_000)).unwrap();
    println!("{} steps", steps);
    state.output().to_vec()
}

macro_rules! case {
    ($name:ident, $code:expr, $expect:expr) => {
        #[test]
        fn $name() {
            assert_eq!(run($code, &[]), $expect);
        }
    };
    ($name:ident, $code:expr, $input:expr, $expect:expr) => {
        #[test]
        fn $name() {
            assert_eq!(run($code, $input), $expect);
        }
    };
}

// Arithmetic
case!(literal, "out(65);", [65]);
case!(add_mul, "out(2 + 3 * 4);", [14]);
case!(wrap_add, "out(200 + 100);", [44]);
case!(wrap_sub, "out(1 - 2);", [255]);
case!(wrap_mul, "out(16 * 17);", [16]);
case!(division, "out(7 / 2); out(7 % 2); out(255 / 16); out(3 / 5);", [3, 1, 15, 0]);
case!(div_by_zero, "out(5 / 0); out(5 % 0);", [0, 5]);
case!(negate, "out(-1); out(-0); out(--7);", [255, 0, 7]);
case!(complement, "out(~0); out(~170);", [255, 85]);
case!(bitwise, "out(12 & 10); out(12 | 10); out(12 ^ 10);", [8, 14, 6]);
case!(shifts, "out(1 << 3); out(200 >> 3); out(129 << 1); out(1 << 8);", [8, 25, 2, 0]);
case!(left_to_right, "out(20 - 5 - 3); out(64 / 4 / 2);", [12, 8]);

// Variables
case!(variables, "u8 x = 5; x = x + 1; out(x);", [6]);
case!(
    operands_unchanged,
    "u8 a = 7; u8 b = 3;
     out(a + b); out(a - b); out(a / b); out(a % b); out(a * b); out(a ^ b); out(a); out(b);",
    [10, 4, 2, 1, 21, 4, 7, 3]
);
case!(self_assign, "u8 x = 9; x = x * x; out(x);", [81]);
case!(assign_value, "u8 x; u8 y; x = y = 4; out(x + y);", [8]);
case!(decl_zero, "u8 x; out(x);", [0]);
case!(
    shadow_in_block,
    "func main() { u8 x = 1; { u8 x = 2; out(x); x = 5; } out(x); } main();",
    [2, 1]
);

// Control flow
case!(
    line_statements,
    "func main() {
        out(1)
        out(2)
    }
    main();",
    [1, 2]
);
case!(if_true, "func main() { if 3 out(1); out(2); } main();", [1, 2]);
case!(if_false, "func main() { if 0 out(1); out(2); } main();", [2]);
case!(
    if_else,
    "func main() { if 0 out(1); else out(3); if 7 out(4); else out(5); } main();",
    [3, 4]
);
case!(
    while_count,
    "func main() { u8 i = 0; while 3 - i { out(i); i = i + 1; } } main();",
    [0, 1, 2]
);
case!(
    nested_loops,
    "func main() {
        u8 i = 2;
        while i { u8 j = 2; while j { out(i * 10 + j); j = j - 1; } i = i - 1; }
    }
    main();",
    [22, 21, 12, 11]
);

// Functions
case!(
    call_value,
    "func add(u8 a, u8 b) -> u8 { return a + b; } out(add(30, 12));",
    [42]
);
case!(
    branch_return,
    "func pick(u8 c) -> u8 { if c { return 10; } else { return 20; } } out(pick(1)); out(pick(0));",
    [10, 20]
);
case!(
    early_return,
    "func early(u8 c) -> u8 { if c return 1; out(9); 2 } out(early(1)); out(early(0));",
    [1, 9, 2]
);
case!(
    return_in_loop,
    "func find(u8 n) -> u8 {
        u8 i = 0;
        while 1 {
            if n - i { } else { return i; }
            i = i + 1;
        }
        out(99);
        0
    }
    out(find(4)); out(find(0));",
    [4, 0]
);
case!(
    void_return,
    "func say(u8 c) { if c return; out(7); } say(1); say(0); say(0);",
    [7, 7]
);
case!(
    overloads,
    "func f(u8 a) -> u8 { a + 1 }
     func f(u8 a, u8 b) -> u8 { f(a) + f(b) }
     func f() -> u8 { 100 }
     out(f(1)); out(f(1, 2)); out(f());",
    [2, 5, 100]
);
case!(
    overload_by_arity,
    "func f(u8 a) -> u8 { 10 } func f(u8 a, u8 b) -> u8 { 20 } out(f(1)); out(f(1, 2));",
    [10, 20]
);
case!(nested_same, "func inc(u8 a) -> u8 { a + 1 } out(inc(inc(inc(1))));", [4]);
case!(
    args_read_params,
    "func g(u8 a, u8 b) -> u8 { a - b } func h(u8 a, u8 b) -> u8 { g(b, a) } out(h(1, 5));",
    [4]
);
case!(
    repeated_calls,
    "func sq(u8 a) -> u8 { a * a }
     func main() { u8 i = 1; while 4 - i { out(sq(i)); i = i + 1; } }
     main();",
    [1, 4, 9]
);

// Structs
case!(
    struct_fields,
    "type P { u8 x, y } P a; a.x = 3; a.y = 4; out(a.x * a.y);",
    [12]
);
case!(
    struct_param,
    "type P { u8 x, y } func sum(P p) -> u8 { p.x + p.y } P a; a.x = 3; a.y = 4; out(sum(a));",
    [7]
);
case!(
    struct_return,
    "type P { u8 x, y }
     func mk(u8 v) -> P { P p; p.x = v; p.y = v + 1; p }
     out(mk(5).y); P q = mk(9); out(q.x);",
    [6, 9]
);
case!(
    struct_copy,
    "type P { u8 x, y } type R { P a, b }
     R r; r.a.x = 1; r.a.y = 2; r.b = r.a; r.a.x = 5;
     out(r.b.x); out(r.b.y); out(r.a.x);",
    [1, 2, 5]
);

// Raw assembly
case!(asm_value, "out(asm(3, 4) -> u8 { >[-<+>]< });", [7]);
case!(asm_statement, "asm(66) -> void { . };", [66]);
case!(echo, "out(in() + 1); out(in());", b"A", [66, 0]);
case!(
    echo_loop,
    "func main() { u8 c = in(); while c { out(c); c = in(); } } main();",
    b"hi",
    [104, 105]
);

#[test]
fn frames_are_disjoint() {
    let source = format!(
        "{}{}",
        PRELUDE,
        "type P { u8 x, y }
         func a(u8 v) -> u8 { u8 t = v * 2; t }
         func b(P p) -> u8 { u8 s = a(p.x) + a(p.y); s }
         P q; q.x = 1; out(b(q));"
    );
    let output = compile(&source).unwrap();
    let mut spans: Vec<(usize, usize)> = output
        .map
        .frames
        .values()
        .filter(|frame| frame.size > 0)
        .map(|frame| (frame.addr, frame.addr + frame.size))
        .collect();
    spans.sort();
    for pair in spans.windows(2) {
        assert!(pair[0].1 <= pair[1].0, "{:?} overlaps {:?}", pair[0], pair[1]);
    }
    for frame in output.map.frames.values() {
        for var in &frame.vars {
            assert!(frame.addr <= var.addr && var.addr + var.size <= frame.addr + frame.size);
        }
    }
}

#[test]
fn variables_are_packed() {
    let source = format!(
        "{}{}",
        PRELUDE,
        "type P { u8 x, y } type R { P a, u8 b }
         func f(P p, u8 n) -> R { R r; { u8 n = 1; P q; q.x = n; } { u8 n = 2; } r.b = n; r }
         R s; s = f(s.a, 3); u8 t; out(s.b + t);"
    );
    let output = compile(&source).unwrap();
    let frame = &output.map.frames["f(P, u8)"];
    let names: Vec<&str> = frame.vars.iter().map(|var| var.name.as_str()).collect();
    assert_eq!(names, ["p", "n", "r", "n", "q", "n"]);

    for frame in output.map.frames.values() {
        let mut spans: Vec<(usize, usize)> = frame
            .vars
            .iter()
            .map(|var| (var.addr, var.addr + var.size))
            .collect();
        spans.sort();
        let mut next = frame.addr;
        for (begin, end) in spans {
            assert_eq!(begin, next, "gap or overlap in {:?}", frame);
            next = end;
        }
        let width: usize = frame.vars.iter().map(|var| var.size).sum();
        assert_eq!(next - frame.addr, width);
        if let Some(ret) = frame.ret {
            assert_eq!(ret, frame.addr + width);
        }
    }
}

#[test]
fn unused_functions_are_not_emitted() {
    let output = compile("func unused(u8 v) -> u8 { v } 1;").unwrap();
    assert!(!output.map.frames.contains_key("unused(u8)"));
    assert!(output.map.frames.contains_key("<entry>"));
}

#[test]
fn symbol_map_yaml() {
    let output = compile("func id(u8 v) -> u8 { v } u8 x = id(3);").unwrap();
    let yaml = output.map.to_yaml().unwrap();
    println!("{}", yaml);
    assert!(yaml.contains("id(u8)"));
    let map = tapec::SymbolMap::from_yaml(&yaml).unwrap();
    assert_eq!(map.frames["id(u8)"].vars[0].name, "v");
    assert_eq!(map.frames["<entry>"].vars[0].name, "x");
}

#[test]
fn entry_starts_at_origin() {
    let output = compile("u8 x = 1;").unwrap();
    let mut state = State::new(Program::new(output.code.0.clone()).unwrap());
    state.run(Some(1000)).unwrap();
    let addr = output.map.frames["<entry>"].vars[0].addr;
    assert_eq!(state.get(addr), 1);
}
