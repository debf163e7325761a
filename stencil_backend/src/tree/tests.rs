use super::*;

macro_rules! assert_prints {
    ($node:expr, $expected:expr $(,)?) => {
        assert_eq!($node.to_string(), $expected);
    };
}

#[test]
fn text() {
    assert_prints!(Node::text("hello\n"), "hello\n");
}

#[test]
fn action() {
    assert_prints!(Node::action(pipe![cmd![Arg::field(".A.B")]]), "{{.A.B}}");
    assert_prints!(Node::action(pipe![cmd![Arg::Dot]]), "{{.}}");
    assert_prints!(Node::action(pipe![cmd![Arg::var("$")]]), "{{$}}");
}

#[test]
fn declarations() {
    assert_prints!(
        Node::action(decl!("$y" => cmd![Arg::string("r")])),
        r#"{{$y := "r"}}"#,
    );
    assert_prints!(
        Node::action(Pipe::assign(&["$y"], vec![cmd![Arg::number("2")]])),
        "{{$y = 2}}",
    );
}

#[test]
fn pipelines() {
    let node = Node::action(pipe![
        cmd![Arg::string("son")],
        cmd![Arg::ident("split"), Arg::string("wat")],
    ]);
    assert_prints!(node, r#"{{"son" | split "wat"}}"#);

    let nested = Node::action(pipe![cmd![
        Arg::ident("mul"),
        Arg::pipe(pipe![cmd![Arg::number("1")], cmd![Arg::ident("incr")]]),
        Arg::number("2"),
    ]]);
    assert_prints!(nested, "{{mul (1 | incr) 2}}");
}

#[test]
fn literals() {
    let node = Node::action(pipe![cmd![
        Arg::ident("print"),
        Arg::bool(true),
        Arg::nil(),
        Arg::number("-1.5"),
        Arg::string("quote\"d"),
    ]]);
    assert_prints!(node, r#"{{print true nil -1.5 "quote\"d"}}"#);
}

#[test]
fn branches() {
    let node = Node::range(
        decl!("$i", "$v" => cmd![Arg::field(".List")]),
        vec![Node::text("x")],
        Some(vec![Node::text("none")]),
    );
    assert_prints!(node, "{{range $i, $v := .List}}x{{else}}none{{end}}");

    let node = Node::if_(pipe![cmd![Arg::bool(false)]], Vec::new(), None);
    assert_prints!(node, "{{if false}}{{end}}");

    let node = Node::with(
        decl!("$x" => cmd![Arg::string("output")]),
        vec![Node::action(pipe![cmd![Arg::Dot]])],
        None,
    );
    assert_prints!(node, r#"{{with $x := "output"}}{{.}}{{end}}"#);
}

#[test]
fn template_calls() {
    assert_prints!(Node::template("rr", None), r#"{{template "rr"}}"#);
    assert_prints!(
        Node::template("rr", Some(pipe![cmd![Arg::var("$x")]])),
        r#"{{template "rr" $x}}"#,
    );
}

#[test]
fn whole_template() {
    let tpl = Template::new(
        "main",
        vec![
            Node::text("a"),
            Node::action(pipe![cmd![Arg::var("$x.A")]]),
            Node::text("b"),
        ],
    );
    assert_prints!(tpl, "a{{$x.A}}b");
}

#[test]
fn path_parsing() {
    assert_eq!(
        Arg::var("$x.A.B"),
        Arg::Variable(Variable {
            name: "$x".to_owned(),
            fields: vec!["A".to_owned(), "B".to_owned()],
        })
    );
    assert_eq!(
        Arg::field("A.B"),
        Arg::Field(vec!["A".to_owned(), "B".to_owned()])
    );
    assert!(Arg::var("$x.A").is_path());
    assert!(!Arg::var("$x").is_path());
    assert!(Arg::field(".A").is_path());
}

#[test]
fn command_shapes() {
    assert!(cmd![Arg::ident("up"), Arg::Dot].is_call());
    assert!(!cmd![Arg::Dot].is_call());
    assert!(cmd![Arg::string("x")].is_single_operand());
    assert!(cmd![Arg::var("$x.A")].is_single_operand());
    assert!(!cmd![Arg::pipe(pipe![cmd![Arg::Dot]])].is_single_operand());
    assert!(!cmd![Arg::field(".M"), Arg::string("x")].is_single_operand());
}
