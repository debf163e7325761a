use super::*;

fn simplified_with(nodes: Vec<Node>, options: &PipelineOptions) -> String {
    let mut tpl = Template::new("test", nodes);
    simplify(&mut tpl, options).unwrap();
    tpl.to_string()
}

fn simplified(nodes: Vec<Node>) -> String {
    simplified_with(nodes, &PipelineOptions::default())
}

fn structural_error(nodes: Vec<Node>) -> TransformError {
    let mut tpl = Template::new("test", nodes);
    let err = simplify(&mut tpl, &PipelineOptions::default()).unwrap_err();
    assert!(matches!(err, TransformError::Structural { .. }), "{:?}", err);
    err
}

#[test]
fn piped_operand_becomes_last_argument() {
    let res = simplified(vec![Node::action(pipe![
        cmd![Arg::string("son")],
        cmd![Arg::ident("split"), Arg::string("wat")],
    ])]);

    assert_eq!(res, r#"{{$var0 := split "wat" "son"}}{{$var0}}"#);
}

#[test]
fn long_chain() {
    let res = simplified(vec![Node::action(pipe![
        cmd![Arg::number("1")],
        cmd![Arg::ident("incr")],
        cmd![Arg::ident("incr")],
        cmd![Arg::ident("mul"), Arg::number("2")],
    ])]);

    assert_eq!(
        res,
        "{{$var1 := incr 1}}{{$var2 := incr $var1}}{{$var0 := mul 2 $var2}}{{$var0}}"
    );
}

#[test]
fn parenthesized_arguments() {
    let incr_one = || Arg::pipe(pipe![cmd![Arg::number("1")], cmd![Arg::ident("incr")]]);
    let res = simplified(vec![Node::action(pipe![cmd![
        Arg::ident("mul"),
        incr_one(),
        incr_one(),
    ]])]);

    assert_eq!(
        res,
        "{{$var0 := incr 1}}{{$var1 := incr 1}}{{$var2 := mul $var0 $var1}}{{$var2}}"
    );
}

#[test]
fn if_condition() {
    let inner = pipe![
        cmd![Arg::string("what")],
        cmd![Arg::ident("up")],
        cmd![Arg::ident("lower")],
    ];
    let cond = pipe![cmd![
        Arg::ident("not"),
        Arg::pipe(pipe![cmd![
            Arg::ident("eq"),
            Arg::pipe(inner),
            Arg::string("what"),
        ]]),
    ]];

    let res = simplified(vec![Node::if_(cond, vec![Node::text("x")], None)]);

    assert_eq!(
        res,
        "{{$var3 := up \"what\"}}{{$var2 := lower $var3}}\
         {{$var1 := eq $var2 \"what\"}}{{$var0 := not $var1}}\
         {{if $var0}}x{{end}}"
    );
}

#[test]
fn range_declarations_stay_on_the_range() {
    let arg = pipe![
        cmd![Arg::pipe(pipe![cmd![Arg::string("what")], cmd![Arg::ident("lower")]])],
        cmd![Arg::ident("up")],
    ];
    let range = Node::range(
        decl!("$i", "$v" => cmd![Arg::string("some")], cmd![Arg::ident("split"), Arg::pipe(arg)]),
        Vec::new(),
        None,
    );

    assert_eq!(
        simplified(vec![range]),
        "{{$var2 := lower \"what\"}}{{$var1 := up $var2}}\
         {{$var0 := split $var1 \"some\"}}{{range $tplI, $tplV := $var0}}{{end}}"
    );
}

#[test]
fn control_paths_are_bound() {
    let res = simplified(vec![
        Node::range(pipe![cmd![Arg::field(".Some")]], Vec::new(), None),
        Node::template("rr", Some(pipe![cmd![Arg::field(".Some")]])),
    ]);

    assert_eq!(
        res,
        "{{$var0 := .Some}}{{range $var0}}{{end}}\
         {{$var1 := .Some}}{{template \"rr\" $var1}}"
    );
}

#[test]
fn dot_is_captured_before_rebinding() {
    let res = simplified(vec![
        Node::range(pipe![cmd![Arg::Dot]], Vec::new(), None),
        Node::with(pipe![cmd![Arg::Dot]], Vec::new(), None),
        Node::if_(pipe![cmd![Arg::Dot]], Vec::new(), None),
    ]);

    assert_eq!(
        res,
        "{{$var0 := .}}{{range $var0}}{{end}}\
         {{$var1 := .}}{{with $var1}}{{end}}\
         {{if .}}{{end}}"
    );
}

#[test]
fn with_body() {
    let res = simplified(vec![Node::with(
        decl!("$x" => cmd![Arg::string("output")]),
        vec![Node::action(pipe![cmd![Arg::Dot], cmd![Arg::ident("up")]])],
        None,
    )]);

    assert_eq!(
        res,
        r#"{{with $tplX := "output"}}{{$var0 := up .}}{{$var0}}{{end}}"#
    );
}

#[test]
fn else_bodies() {
    let res = simplified(vec![Node::if_(
        pipe![cmd![Arg::bool(true)]],
        Vec::new(),
        Some(vec![Node::action(pipe![cmd![Arg::field(".A")]])]),
    )]);

    assert_eq!(res, "{{if true}}{{else}}{{$var0 := .A}}{{$var0}}{{end}}");
}

#[test]
fn redundant_parentheses() {
    let res = simplified(vec![Node::action(decl!(
        "$t" => cmd![Arg::pipe(pipe![cmd![Arg::string("what")], cmd![Arg::ident("up")]])]
    ))]);

    assert_eq!(res, r#"{{$tplT := up "what"}}"#);
}

#[test]
fn paths() {
    let res = simplified(vec![
        Node::action(pipe![cmd![Arg::field(".S")], cmd![Arg::ident("up")]]),
        Node::action(pipe![cmd![Arg::ident("up"), Arg::field(".S")]]),
        Node::action(pipe![cmd![Arg::field(".S")]]),
    ]);

    assert_eq!(
        res,
        "{{$var0 := .S}}{{$var1 := up $var0}}{{$var1}}\
         {{$var2 := .S}}{{$var3 := up $var2}}{{$var3}}\
         {{$var4 := .S}}{{$var4}}"
    );
}

#[test]
fn path_arguments_of_bound_calls() {
    let res = simplified(vec![
        Node::action(decl!("$x" => cmd![Arg::ident("up"), Arg::field(".A.B")])),
        Node::if_(
            pipe![cmd![Arg::ident("eq"), Arg::field(".A.B"), Arg::string("x")]],
            Vec::new(),
            None,
        ),
    ]);

    assert_eq!(
        res,
        "{{$var0 := .A.B}}{{$tplX := up $var0}}\
         {{$var2 := .A.B}}{{$var1 := eq $var2 \"x\"}}{{if $var1}}{{end}}"
    );
}

#[test]
fn simple_nodes_are_untouched() {
    let res = simplified(vec![
        Node::text("hello "),
        Node::action(pipe![cmd![Arg::Dot]]),
        Node::action(decl!("$x" => cmd![Arg::field(".A")])),
        Node::action(pipe![cmd![Arg::var("$x")]]),
        Node::template("rr", None),
    ]);

    assert_eq!(
        res,
        r#"hello {{.}}{{$tplX := .A}}{{$tplX}}{{template "rr"}}"#
    );
}

#[test]
fn without_renaming() {
    let options = PipelineOptions::new(false, true);
    let res = simplified_with(
        vec![
            Node::action(decl!("$var0" => cmd![Arg::string("a")])),
            Node::action(decl!("$x" => cmd![Arg::string("a")], cmd![Arg::ident("up")])),
            Node::action(pipe![cmd![Arg::ident("up"), Arg::var("$x")]]),
        ],
        &options,
    );

    assert_eq!(
        res,
        r#"{{$var0 := "a"}}{{$x := up "a"}}{{$var1 := up $x}}{{$var1}}"#
    );
}

#[test]
fn canonical_names_dont_collide() {
    let res = simplified(vec![
        Node::action(decl!("$x" => cmd![Arg::number("1")])),
        Node::action(decl!("$X" => cmd![Arg::number("2")])),
        Node::action(decl!("$tplX0" => cmd![Arg::number("3")])),
        Node::action(pipe![cmd![Arg::ident("mul"), Arg::var("$x"), Arg::var("$X")]]),
    ]);

    assert_eq!(
        res,
        "{{$tplX := 1}}{{$tplX1 := 2}}{{$tplX0 := 3}}\
         {{$var0 := mul $tplX $tplX1}}{{$var0}}"
    );
}

#[test]
fn idempotent() {
    let mut tpl = Template::new(
        "test",
        vec![
            Node::action(pipe![
                cmd![Arg::number("1")],
                cmd![Arg::ident("incr")],
                cmd![Arg::ident("mul"), Arg::pipe(pipe![cmd![Arg::ident("incr"), Arg::number("2")]])],
            ]),
            Node::range(
                pipe![cmd![Arg::field(".Some")]],
                vec![Node::action(pipe![cmd![Arg::Dot], cmd![Arg::ident("up")]])],
                None,
            ),
        ],
    );

    let options = PipelineOptions::default();
    simplify(&mut tpl, &options).unwrap();
    let once = tpl.clone();
    simplify(&mut tpl, &options).unwrap();
    assert_eq!(tpl, once);
}

#[test]
fn uncased_names_are_renamed_once() {
    let mut tpl = Template::new(
        "test",
        vec![
            Node::action(decl!("$_" => cmd![Arg::string("a")])),
            Node::action(decl!("$1" => cmd![Arg::string("b")])),
            Node::action(decl!("$日" => cmd![Arg::string("c")])),
            Node::action(pipe![cmd![Arg::var("$_")]]),
        ],
    );

    let options = PipelineOptions::default();
    simplify(&mut tpl, &options).unwrap();
    assert_eq!(
        tpl.to_string(),
        r#"{{$tplV := "a"}}{{$tplV1 := "b"}}{{$tplV日 := "c"}}{{$tplV}}"#
    );

    let once = tpl.clone();
    simplify(&mut tpl, &options).unwrap();
    assert_eq!(tpl, once);
}

#[test]
fn too_many_declarations() {
    structural_error(vec![Node::if_(
        decl!("$a", "$b" => cmd![Arg::Dot]),
        Vec::new(),
        None,
    )]);
    structural_error(vec![Node::range(
        decl!("$a", "$b", "$c" => cmd![Arg::Dot]),
        Vec::new(),
        None,
    )]);
    structural_error(vec![Node::action(decl!("$a", "$b" => cmd![Arg::Dot]))]);
}

#[test]
fn malformed_pipes() {
    let span = Span::new(10, 4);
    let err = structural_error(vec![Node::action(Pipe::new(Vec::new())).with_span(span)]);
    assert_eq!(err.span(), span);

    structural_error(vec![Node::action(pipe![cmd![]])]);
    structural_error(vec![Node::if_(Pipe::new(Vec::new()), Vec::new(), None)]);
    structural_error(vec![Node::action(pipe![cmd![
        Arg::ident("up"),
        Arg::pipe(decl!("$x" => cmd![Arg::string("a")])),
    ]])]);
}

#[test]
fn nested_structure_is_checked() {
    structural_error(vec![Node::with(
        pipe![cmd![Arg::Dot]],
        Vec::new(),
        Some(vec![Node::action(Pipe::new(Vec::new()))]),
    )]);
}
