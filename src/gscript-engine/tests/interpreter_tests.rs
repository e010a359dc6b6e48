use gscript_engine::{EngineConfig, EvalError, Interpreter, ScriptEngine};
use gscript_shared::{HostIterator, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn eval(source: &str) -> Value {
    Interpreter::default()
        .eval(source)
        .unwrap_or_else(|e| panic!("evaluation failed: {e}\nsource: {source}"))
}

fn eval_json(source: &str) -> serde_json::Value {
    eval(source).to_json().unwrap()
}

#[test]
fn test_arithmetic_and_strings() {
    assert_eq!(eval("1 + 2 * 3"), Value::Int(7));
    assert_eq!(eval("7 / 2"), Value::Float(3.5));
    assert_eq!(eval("6 / 3"), Value::Int(2));
    assert_eq!(eval("'a' + 1 + 2"), Value::string("a12"));
    assert_eq!(eval("1 + 2 + 'a'"), Value::string("3a"));
    assert_eq!(eval("'Hello'.toUpperCase() + ' ' + 'WORLD'.toLowerCase()"), Value::string("HELLO world"));
    assert_eq!(eval("'a,b,c'.split(',').length"), Value::Int(3));
    assert_eq!(eval("'hello'.substring(1, 3)"), Value::string("el"));
    assert_eq!(eval("'hello'.slice(-3)"), Value::string("llo"));
    assert_eq!(eval("(3.14159).toFixed(2)"), Value::string("3.14"));
}

#[test]
fn test_equality_and_typeof() {
    assert_eq!(eval("1 == '1'"), Value::Bool(true));
    assert_eq!(eval("1 === '1'"), Value::Bool(false));
    assert_eq!(eval("null == undefined"), Value::Bool(true));
    assert_eq!(eval("typeof 'x'"), Value::string("string"));
    assert_eq!(eval("typeof missingName"), Value::string("undefined"));
    assert_eq!(eval("typeof function() {}"), Value::string("function"));
    assert_eq!(eval("var a = [1]; var b = a; a === b"), Value::Bool(true));
}

#[test]
fn test_closures_capture_environment() {
    let source = r"
        function counter() {
            var count = 0;
            return function() { count += 1; return count; };
        }
        var next = counter();
        next(); next();
        next()
    ";
    assert_eq!(eval(source), Value::Int(3));
}

#[test]
fn test_function_hoisting() {
    assert_eq!(eval("var x = double(21); function double(n) { return n * 2 } x"), Value::Int(42));
}

#[test]
fn test_var_is_function_scoped_and_let_is_block_scoped() {
    assert_eq!(eval("function f() { if (true) { var v = 1 } return v } f()"), Value::Int(1));
    let err = Interpreter::default()
        .eval("function g() { if (true) { let w = 1 } return w } g()")
        .unwrap_err();
    assert!(matches!(err, EvalError::Reference(ref name) if name == "w"));
}

#[test]
fn test_const_cannot_be_reassigned() {
    let err = Interpreter::default().eval("const c = 1; c = 2").unwrap_err();
    assert!(matches!(err, EvalError::Type(_)), "got {err:?}");
}

#[test]
fn test_undeclared_assignment_creates_global() {
    let interp = Interpreter::default();
    interp.eval("function f() { leaked = 5 } f()").unwrap();
    assert_eq!(interp.get_global("leaked"), Some(Value::Int(5)));
}

#[test]
fn test_loops() {
    let source = r"
        var total = 0;
        for (var i = 0; i < 10; i++) {
            if (i == 2) continue;
            if (i == 6) break;
            total += i;
        }
        var j = 0;
        while (j < 3) { j++ }
        total * 10 + j
    ";
    assert_eq!(eval(source), Value::Int(133));
    assert_eq!(eval("var s = ''; for (const c of 'abc') { s = c + s } s"), Value::string("cba"));
}

#[test]
fn test_array_methods() {
    assert_eq!(
        eval_json("[1, 2, 3, 4].filter(x => x % 2 == 0).map(x => x * 10)"),
        serde_json::json!([20, 40])
    );
    assert_eq!(eval("[1, 2, 3].reduce((a, b) => a + b, 0)"), Value::Int(6));
    assert_eq!(eval("[3, 1, 2].indexOf(2)"), Value::Int(2));
    assert_eq!(eval("['a', 'b'].join('-')"), Value::string("a-b"));
    assert_eq!(eval("var a = []; a.push(1, 2); a[4] = 5; a.length"), Value::Int(5));
}

#[test]
fn test_objects_and_json() {
    assert_eq!(
        eval_json("var o = {name: 'Ada', tags: ['x']}; o.age = 36; o"),
        serde_json::json!({"name": "Ada", "tags": ["x"], "age": 36})
    );
    assert_eq!(eval("JSON.stringify({a: [1, null]})"), Value::string(r#"{"a":[1,null]}"#));
    assert_eq!(eval("JSON.parse('{\"n\": 2}').n + 1"), Value::Int(3));
    assert_eq!(eval("Object.keys({b: 1, a: 2}).join()"), Value::string("b,a"));
}

#[test]
fn test_method_shorthand_and_this() {
    let source = r"
        var account = {
            balance: 10,
            deposit(n) { this.balance += n; return this }
        };
        account.deposit(5).deposit(1).balance
    ";
    assert_eq!(eval(source), Value::Int(16));
}

#[test]
fn test_apply_and_call() {
    let interp = Interpreter::default();
    interp
        .eval("function describe(a, b) { return this.prefix + a + b + arguments.length }")
        .unwrap();
    assert_eq!(
        interp.eval("describe.apply({prefix: '>'}, ['x', 'y'])").unwrap(),
        Value::string(">xy2")
    );
    assert_eq!(
        interp.eval("describe.call({prefix: '#'}, 1, 2)").unwrap(),
        Value::string("#122")
    );
    assert_eq!(
        interp.eval("describe.apply({prefix: ''}, null)").unwrap(),
        Value::string("nullnull0")
    );
}

#[test]
fn test_try_catch_finally() {
    let source = r"
        var log = [];
        function risky() { throw Error('boom') }
        try {
            risky();
        } catch (e) {
            log.push(e.message);
        } finally {
            log.push('done');
        }
        log.join(' ')
    ";
    assert_eq!(eval(source), Value::string("boom done"));
    assert_eq!(
        eval("var r; try { undefinedThing() } catch (e) { r = e } r"),
        Value::string("ReferenceError: undefinedThing is not defined")
    );
}

#[test]
fn test_uncaught_throw_reaches_host() {
    let err = Interpreter::default()
        .eval("throw {message: 'bad input', code: 7}")
        .unwrap_err();
    match err {
        EvalError::Thrown { message, value } => {
            assert_eq!(message, "bad input");
            assert_eq!(value["code"], 7);
        }
        other => panic!("expected a thrown value, got {other:?}"),
    }
}

#[test]
fn test_syntax_errors_surface_from_eval() {
    let err = Interpreter::default().eval("var = ;").unwrap_err();
    assert!(err.is_syntax());
}

#[test]
fn test_host_iterator_in_for_of() {
    let interp = Interpreter::default();
    let numbers = HostIterator::from_values("Numbers", (1..=4).map(Value::Int));
    interp.bind("numbers", Value::host(numbers));
    assert_eq!(
        interp.eval("var sum = 0; for (var n of numbers) { sum += n } sum").unwrap(),
        Value::Int(10)
    );
}

#[test]
fn test_script_iterator_protocol_in_for_of() {
    let source = r"
        function range(n) {
            var i = 0;
            return { hasNext: () => i < n, next: () => i++ };
        }
        var out = [];
        for (const x of range(3)) { out.push(x) }
        out.join()
    ";
    assert_eq!(eval(source), Value::string("0,1,2"));
}

#[test]
fn test_invoke_and_bind() {
    let interp = Interpreter::default();
    interp.bind("factor", Value::Int(3));
    interp.eval("function scale(x) { return x * factor }").unwrap();
    assert_eq!(interp.invoke("scale", &[Value::Int(5)]).unwrap(), Value::Int(15));

    let err = interp.invoke("missing", &[]).unwrap_err();
    assert!(matches!(err, EvalError::Reference(_)));
    let err = interp.invoke("factor", &[]).unwrap_err();
    assert!(matches!(err, EvalError::Type(_)));
}

#[test]
fn test_recursion_limit() {
    let interp = Interpreter::new(EngineConfig::default().with_max_call_depth(16));
    interp.eval("function fact(n) { return n <= 1 ? 1 : n * fact(n - 1) }").unwrap();
    assert_eq!(interp.invoke("fact", &[Value::Int(10)]).unwrap(), Value::Int(3_628_800));

    interp.eval("function forever(n) { return forever(n + 1) }").unwrap();
    let err = interp.invoke("forever", &[Value::Int(0)]).unwrap_err();
    assert!(matches!(err, EvalError::RecursionLimit(16)));
    assert_eq!(interp.call_depth(), 0);
}

#[test]
fn test_default_recursion_limit_is_reported() {
    let handle = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let interp = Interpreter::default();
            interp.eval("function down(n) { return down(n + 1) }").unwrap();
            interp.invoke("down", &[Value::Int(0)]).unwrap_err().to_string()
        })
        .unwrap();
    let message = handle.join().unwrap();
    assert_eq!(message, "RangeError: maximum call depth of 256 exceeded");
}

#[test]
fn test_labels_and_relationship_types() {
    assert_eq!(eval("Label('User').name"), Value::string("User"));
    assert_eq!(eval("RelationshipType('KNOWS').name()"), Value::string("KNOWS"));
}

proptest! {
    #[test]
    fn prop_integer_arithmetic_matches_host(a in -10_000i64..10_000, b in -10_000i64..10_000) {
        let interp = Interpreter::default();
        interp.bind("a", Value::Int(a));
        interp.bind("b", Value::Int(b));
        prop_assert_eq!(interp.eval("a + b").unwrap(), Value::Int(a + b));
        prop_assert_eq!(interp.eval("a - b").unwrap(), Value::Int(a - b));
        prop_assert_eq!(interp.eval("a * b").unwrap(), Value::Int(a * b));
        prop_assert_eq!(interp.eval("a < b").unwrap(), Value::Bool(a < b));
    }

    #[test]
    fn prop_string_concat_matches_host(s in "[a-z ]{0,12}", t in "[a-z ]{0,12}") {
        let interp = Interpreter::default();
        interp.bind("s", Value::string(s.clone()));
        interp.bind("t", Value::string(t.clone()));
        prop_assert_eq!(interp.eval("s + t").unwrap(), Value::String(format!("{s}{t}")));
        prop_assert_eq!(
            interp.eval("(s + t).length").unwrap(),
            Value::Int(i64::try_from(s.len() + t.len()).unwrap())
        );
    }
}
