use super::*;
use crate::{
    fixtures::{environment, Schema},
    simplify::simplify,
    typecheck::typecheck,
    unshadow::unshadow,
};

fn unholed_with(nodes: Vec<Node>, env: &Environment, options: &PipelineOptions) -> String {
    let mut tpl = Template::new("test", nodes);
    unshadow(&mut tpl).unwrap();
    simplify(&mut tpl, options).unwrap();
    let mut scopes = typecheck(&tpl, env, options).unwrap();
    unhole(&mut tpl, &mut scopes, env, options).unwrap();
    tpl.to_string()
}

fn unholed(nodes: Vec<Node>, env: &Environment) -> String {
    unholed_with(nodes, env, &PipelineOptions::default())
}

fn bind(name: &'static str, args: Vec<Arg>) -> Node {
    Node::action(Pipe::declare(&[name], vec![crate::tree::Command::new(args)]))
}

#[test]
fn paths_through_dynamic_values() {
    let env = environment(|s| s.type4);

    let res = unholed(
        vec![
            bind("$x", vec![Arg::field(".Some")]),
            bind("$y", vec![Arg::field(".Some.Some")]),
            bind("$z", vec![Arg::Dot]),
        ],
        &env,
    );

    assert_eq!(
        res,
        r#"{{$tplX := .Some}}{{$tplY := browsePropertyPath . "Some.Some"}}{{$tplZ := .}}"#
    );
}

#[test]
fn dynamic_variables() {
    let env = environment(|s| s.type4);

    let res = unholed(
        vec![
            bind("$x", vec![Arg::field(".Some")]),
            bind("$y", vec![Arg::var("$x.Some")]),
        ],
        &env,
    );

    assert_eq!(
        res,
        r#"{{$tplX := .Some}}{{$tplY := browsePropertyPath $tplX "Some"}}"#
    );
}

#[test]
fn methods() {
    let env = environment(|s| s.type4);

    let res = unholed(
        vec![
            bind("$a", vec![Arg::field(".Method")]),
            bind("$b", vec![Arg::field(".Some.Method")]),
            bind("$c", vec![Arg::field(".Some.MethodArgs"), Arg::string("r")]),
        ],
        &env,
    );

    assert_eq!(
        res,
        "{{$tplA := .Method}}\
         {{$tplB := browsePropertyPath . \"Some.Method\"}}\
         {{$tplC := browsePropertyPath . \"Some.MethodArgs\" \"r\"}}"
    );
}

#[test]
fn printed_paths() {
    let env = environment(|s| s.type4);

    let res = unholed(vec![Node::action(pipe![cmd![Arg::field(".Some.Some")]])], &env);

    assert_eq!(
        res,
        r#"{{$var0 := browsePropertyPath . "Some.Some"}}{{$var0}}"#
    );
}

#[test]
fn paths_piped_or_passed_to_calls() {
    let env = environment(|s| s.type4);

    let res = unholed(
        vec![
            Node::action(pipe![cmd![Arg::field(".Some.Some")], cmd![Arg::ident("up")]]),
            Node::if_(
                pipe![cmd![Arg::ident("eq"), Arg::field(".Some.Some"), Arg::string("x")]],
                Vec::new(),
                None,
            ),
        ],
        &env,
    );

    assert_eq!(
        res,
        "{{$var0 := browsePropertyPath . \"Some.Some\"}}{{$var1 := up $var0}}{{$var1}}\
         {{$var3 := browsePropertyPath . \"Some.Some\"}}{{$var2 := eq $var3 \"x\"}}\
         {{if $var2}}{{end}}"
    );
}

#[test]
fn static_prefix_is_kept() {
    let mut schema = Schema::new();
    let type4 = schema.type4;
    let outer = schema.types.add_record("outer");
    schema
        .types
        .record_mut(outer)
        .unwrap()
        .add_field("Inner", type4);
    let env = schema.environment(outer);

    let res = unholed(
        vec![bind("$x", vec![Arg::field(".Inner.Some.Some.Some")])],
        &env,
    );

    assert_eq!(
        res,
        r#"{{$tplX := browsePropertyPath .Inner "Some.Some.Some"}}"#
    );
}

#[test]
fn untyped_data() {
    let env = Environment::untyped();

    let res = unholed(
        vec![Node::range(
            pipe![cmd![Arg::field(".Items")]],
            vec![
                Node::action(pipe![cmd![Arg::field(".Name")]]),
                Node::action(pipe![cmd![Arg::field(".Name.First")]]),
            ],
            None,
        )],
        &env,
    );

    assert_eq!(
        res,
        "{{$var0 := .Items}}{{range $var0}}{{$var1 := .Name}}{{$var1}}\
         {{$var2 := browsePropertyPath . \"Name.First\"}}{{$var2}}{{end}}"
    );
}

#[test]
fn frames_are_replayed_in_order() {
    let env = environment(|s| s.type4);

    let res = unholed(
        vec![Node::with(
            decl!("$x" => cmd![Arg::field(".Some")]),
            vec![bind("$z", vec![Arg::field(".A.B")])],
            Some(vec![bind("$y", vec![Arg::field(".Some.Some")])]),
        )],
        &env,
    );

    assert_eq!(
        res,
        "{{$var0 := .Some}}{{with $tplX := $var0}}\
         {{$tplZ := browsePropertyPath . \"A.B\"}}\
         {{else}}{{$tplY := browsePropertyPath . \"Some.Some\"}}{{end}}"
    );
}

#[test]
fn custom_lookup_function() {
    let env = environment(|s| s.type4);
    let options = PipelineOptions::default().with_lookup_function("lookup");

    let res = unholed_with(vec![bind("$y", vec![Arg::field(".Some.Some")])], &env, &options);

    assert_eq!(res, r#"{{$tplY := lookup . "Some.Some"}}"#);
}

#[test]
fn scopes_from_another_tree() {
    let env = Environment::untyped();
    let options = PipelineOptions::default();
    let mut scopes = ScopeStack::new(env.root);
    let mut tpl = Template::new(
        "test",
        vec![Node::range(pipe![cmd![Arg::var("$x")]], Vec::new(), None)],
    );

    let err = unhole(&mut tpl, &mut scopes, &env, &options).unwrap_err();
    assert!(
        matches!(err, TransformError::InvariantViolation { .. }),
        "{:?}",
        err
    );

    let mut tpl = Template::new("test", vec![bind("$x", vec![Arg::field(".A")])]);
    let err = unhole(&mut tpl, &mut scopes, &env, &options).unwrap_err();
    assert!(
        matches!(err, TransformError::InvariantViolation { .. }),
        "{:?}",
        err
    );
}
