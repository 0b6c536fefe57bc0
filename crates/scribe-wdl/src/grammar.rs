//! WDL productions and the two precedence grammars.

use scribe_runtime::{
    Associativity::Left, AstTransform, Grammar, GrammarBuilder, GrammarError, ListShape, NonterminalId,
};

use crate::terminals::TokenKind as T;

pub(crate) struct WdlGrammar {
    pub grammar: Grammar,
    pub expression: NonterminalId,
    pub type_expression: NonterminalId,
}

fn node(name: &str, fields: &[(&str, usize)]) -> Option<AstTransform> {
    Some(AstTransform::node(name, fields))
}

fn substitute(index: usize) -> Option<AstTransform> {
    Some(AstTransform::Substitution(index))
}

fn separated(separator: T) -> ListShape {
    ListShape::separated(separator)
}

pub(crate) fn build() -> Result<WdlGrammar, GrammarError> {
    let mut g = GrammarBuilder::new();
    for &kind in T::ALL {
        let id = g.terminal(kind.name());
        debug_assert_eq!(id, kind.id());
    }

    let document = g.nonterminal("document");
    let import = g.nonterminal("import");
    let import_namespace = g.nonterminal("import_namespace");
    let workflow_or_task = g.nonterminal("workflow_or_task");
    let task = g.nonterminal("task");
    let sections = g.nonterminal("sections");
    let command = g.nonterminal("command");
    let command_part = g.nonterminal("command_part");
    let cmd_param = g.nonterminal("cmd_param");
    let cmd_param_kv = g.nonterminal("cmd_param_kv");
    let outputs = g.nonterminal("outputs");
    let output_kv = g.nonterminal("output_kv");
    let runtime = g.nonterminal("runtime");
    let parameter_meta = g.nonterminal("parameter_meta");
    let meta = g.nonterminal("meta");
    let map = g.nonterminal("map");
    let map_kv = g.nonterminal("map_kv");
    let declaration = g.nonterminal("declaration");
    let setter = g.nonterminal("setter");
    let workflow = g.nonterminal("workflow");
    let wf_body_element = g.nonterminal("wf_body_element");
    let call = g.nonterminal("call");
    let alias = g.nonterminal("alias");
    let call_body = g.nonterminal("call_body");
    let call_input = g.nonterminal("call_input");
    let mapping = g.nonterminal("mapping");
    let while_loop = g.nonterminal("while_loop");
    let if_stmt = g.nonterminal("if_stmt");
    let scatter = g.nonterminal("scatter");
    let wf_outputs = g.nonterminal("wf_outputs");
    let wf_output = g.nonterminal("wf_output");
    let wf_output_declaration = g.nonterminal("wf_output_declaration_syntax");
    let wf_output_wildcard_syntax = g.nonterminal("wf_output_wildcard_syntax");
    let wf_output_wildcard = g.nonterminal("wf_output_wildcard");
    let object_kv = g.nonterminal("object_kv");
    let map_literal_kv = g.nonterminal("map_literal_kv");
    let e = g.nonterminal("e");
    let type_e = g.nonterminal("type_e");

    // document
    let imports = g.list_of(import.into(), ListShape::new());
    let body = g.list_of(workflow_or_task.into(), ListShape::new());
    g.rule(
        document,
        &[imports.into(), body.into()],
        node("Namespace", &[("imports", 0), ("body", 1)]),
    );
    let namespace = g.optional_of(import_namespace.into());
    g.rule(
        import,
        &[T::Import.into(), T::String.into(), namespace.into()],
        node("Import", &[("uri", 1), ("namespace", 2)]),
    );
    g.rule(import_namespace, &[T::As.into(), T::Identifier.into()], substitute(1));
    g.rule(workflow_or_task, &[workflow.into()], None);
    g.rule(workflow_or_task, &[task.into()], None);

    // task
    let declarations = g.list_of(declaration.into(), ListShape::new());
    let task_sections = g.list_of(sections.into(), ListShape::new());
    g.rule(
        task,
        &[
            T::Task.into(),
            T::Identifier.into(),
            T::Lbrace.into(),
            declarations.into(),
            task_sections.into(),
            T::Rbrace.into(),
        ],
        node("Task", &[("name", 1), ("declarations", 3), ("sections", 4)]),
    );
    for section in [command, outputs, runtime, parameter_meta, meta] {
        g.rule(sections, &[section.into()], None);
    }

    let parts = g.list_of(command_part.into(), ListShape::new());
    g.rule(
        command,
        &[
            T::RawCommand.into(),
            T::RawCmdStart.into(),
            parts.into(),
            T::RawCmdEnd.into(),
        ],
        node("RawCommand", &[("parts", 2)]),
    );
    g.rule(command_part, &[T::CmdPart.into()], None);
    g.rule(command_part, &[cmd_param.into()], None);
    let attributes = g.list_of(cmd_param_kv.into(), ListShape::new());
    g.rule(
        cmd_param,
        &[
            T::CmdParamStart.into(),
            attributes.into(),
            e.into(),
            T::CmdParamEnd.into(),
        ],
        node("CommandParameter", &[("attributes", 1), ("expr", 2)]),
    );
    g.rule(
        cmd_param_kv,
        &[
            T::CmdAttrHint.into(),
            T::Identifier.into(),
            T::Equal.into(),
            e.into(),
        ],
        node("CommandParameterAttr", &[("key", 1), ("value", 3)]),
    );

    let output_kvs = g.list_of(output_kv.into(), ListShape::new());
    g.rule(
        outputs,
        &[
            T::Output.into(),
            T::Lbrace.into(),
            output_kvs.into(),
            T::Rbrace.into(),
        ],
        node("Outputs", &[("attributes", 2)]),
    );
    g.rule(
        output_kv,
        &[
            type_e.into(),
            T::Identifier.into(),
            T::Equal.into(),
            e.into(),
        ],
        node("Output", &[("type", 0), ("name", 1), ("expression", 3)]),
    );

    g.rule(
        runtime,
        &[T::Runtime.into(), map.into()],
        node("Runtime", &[("map", 1)]),
    );
    g.rule(
        parameter_meta,
        &[T::ParameterMeta.into(), map.into()],
        node("ParameterMeta", &[("map", 1)]),
    );
    g.rule(meta, &[T::Meta.into(), map.into()], node("Meta", &[("map", 1)]));
    let map_kvs = g.list_of(map_kv.into(), ListShape::new());
    g.rule(
        map,
        &[T::Lbrace.into(), map_kvs.into(), T::Rbrace.into()],
        substitute(1),
    );
    g.rule(
        map_kv,
        &[T::Identifier.into(), T::Colon.into(), e.into()],
        node("RuntimeAttribute", &[("key", 0), ("value", 2)]),
    );

    let value = g.optional_of(setter.into());
    g.rule(
        declaration,
        &[type_e.into(), T::Identifier.into(), value.into()],
        node("Declaration", &[("type", 0), ("name", 1), ("expression", 2)]),
    );
    g.rule(setter, &[T::Equal.into(), e.into()], substitute(1));

    // workflow
    let elements = g.list_of(wf_body_element.into(), ListShape::new());
    g.rule(
        workflow,
        &[
            T::Workflow.into(),
            T::Identifier.into(),
            T::Lbrace.into(),
            elements.into(),
            T::Rbrace.into(),
        ],
        node("Workflow", &[("name", 1), ("body", 3)]),
    );
    for element in [
        call,
        declaration,
        while_loop,
        if_stmt,
        scatter,
        wf_outputs,
        parameter_meta,
        meta,
    ] {
        g.rule(wf_body_element, &[element.into()], None);
    }

    let call_alias = g.optional_of(alias.into());
    let body = g.optional_of(call_body.into());
    g.rule(
        call,
        &[T::Call.into(), T::Fqn.into(), call_alias.into(), body.into()],
        node("Call", &[("task", 1), ("alias", 2), ("body", 3)]),
    );
    g.rule(alias, &[T::As.into(), T::Identifier.into()], substitute(1));
    let inputs = g.list_of(call_input.into(), ListShape::new());
    g.rule(
        call_body,
        &[
            T::Lbrace.into(),
            declarations.into(),
            inputs.into(),
            T::Rbrace.into(),
        ],
        node("CallBody", &[("declarations", 1), ("io", 2)]),
    );
    let mappings = g.list_of(mapping.into(), separated(T::Comma));
    g.rule(
        call_input,
        &[T::Input.into(), T::Colon.into(), mappings.into()],
        node("Inputs", &[("map", 2)]),
    );
    g.rule(
        mapping,
        &[T::Identifier.into(), T::Equal.into(), e.into()],
        node("IOMapping", &[("key", 0), ("value", 2)]),
    );

    let block = |g: &mut GrammarBuilder, keyword: T, nonterminal: NonterminalId, name: &str| {
        g.rule(
            nonterminal,
            &[
                keyword.into(),
                T::Lparen.into(),
                e.into(),
                T::Rparen.into(),
                T::Lbrace.into(),
                elements.into(),
                T::Rbrace.into(),
            ],
            node(name, &[("expression", 2), ("body", 5)]),
        );
    };
    block(&mut g, T::While, while_loop, "WhileLoop");
    block(&mut g, T::If, if_stmt, "If");
    g.rule(
        scatter,
        &[
            T::Scatter.into(),
            T::Lparen.into(),
            T::Identifier.into(),
            T::In.into(),
            e.into(),
            T::Rparen.into(),
            T::Lbrace.into(),
            elements.into(),
            T::Rbrace.into(),
        ],
        node("Scatter", &[("item", 2), ("collection", 4), ("body", 7)]),
    );

    let wf_output_list = g.list_of(wf_output.into(), ListShape::new());
    g.rule(
        wf_outputs,
        &[
            T::Output.into(),
            T::Lbrace.into(),
            wf_output_list.into(),
            T::Rbrace.into(),
        ],
        node("WorkflowOutputs", &[("outputs", 2)]),
    );
    g.rule(wf_output, &[wf_output_declaration.into()], None);
    g.rule(wf_output, &[wf_output_wildcard_syntax.into()], None);
    g.rule(
        wf_output_declaration,
        &[
            type_e.into(),
            T::Identifier.into(),
            T::Equal.into(),
            e.into(),
        ],
        node(
            "WorkflowOutputDeclaration",
            &[("type", 0), ("name", 1), ("expression", 3)],
        ),
    );
    // the legacy form is comma separated, declarations are not
    let wildcard = g.optional_of(wf_output_wildcard.into());
    let comma = g.optional_of(T::Comma.into());
    g.rule(
        wf_output_wildcard_syntax,
        &[T::Fqn.into(), wildcard.into(), comma.into()],
        node("WorkflowOutputWildcard", &[("fqn", 0), ("wildcard", 1)]),
    );
    g.rule(
        wf_output_wildcard,
        &[T::Dot.into(), T::Asterisk.into()],
        substitute(1),
    );

    g.rule(
        object_kv,
        &[T::Identifier.into(), T::Colon.into(), e.into()],
        node("ObjectKV", &[("key", 0), ("value", 2)]),
    );
    g.rule(
        map_literal_kv,
        &[e.into(), T::Colon.into(), e.into()],
        node("MapLiteralKv", &[("key", 0), ("value", 2)]),
    );

    expression(&mut g, e, object_kv, map_literal_kv);
    type_expression(&mut g, type_e);

    g.start(document);
    let grammar = g.build()?;
    Ok(WdlGrammar {
        grammar,
        expression: e,
        type_expression: type_e,
    })
}

fn binary(name: &str) -> AstTransform {
    AstTransform::node(name, &[("lhs", 0), ("rhs", 2)])
}

/// Expression grammar, binding powers from loosest to tightest.
fn expression(
    g: &mut GrammarBuilder,
    e: NonterminalId,
    object_kv: NonterminalId,
    map_literal_kv: NonterminalId,
) {
    g.expression(e);

    g.binary(e, 2, T::DoublePipe, Left, binary("LogicalOr"));
    g.binary(e, 3, T::DoubleAmpersand, Left, binary("LogicalAnd"));
    g.binary(e, 4, T::DoubleEqual, Left, binary("Equals"));
    g.binary(e, 4, T::NotEqual, Left, binary("NotEquals"));
    g.binary(e, 5, T::Lt, Left, binary("LessThan"));
    g.binary(e, 5, T::Lteq, Left, binary("LessThanOrEqual"));
    g.binary(e, 5, T::Gt, Left, binary("GreaterThan"));
    g.binary(e, 5, T::Gteq, Left, binary("GreaterThanOrEqual"));
    g.binary(e, 6, T::Plus, Left, binary("Add"));
    g.binary(e, 6, T::Dash, Left, binary("Subtract"));
    g.binary(e, 7, T::Asterisk, Left, binary("Multiply"));
    g.binary(e, 7, T::Slash, Left, binary("Divide"));
    g.binary(e, 7, T::Percent, Left, binary("Remainder"));

    let unary = |name: &str| AstTransform::node(name, &[("expression", 1)]);
    g.unary(e, 8, T::Not, unary("LogicalNot"));
    g.unary(e, 8, T::Plus, unary("UnaryPlus"));
    g.unary(e, 8, T::Dash, unary("UnaryNegation"));

    let params = g.list_of(e.into(), separated(T::Comma));
    g.led(
        e,
        9,
        &[T::Lparen.into(), params.into(), T::Rparen.into()],
        AstTransform::node("FunctionCall", &[("name", 0), ("params", 2)]),
    );
    g.led(
        e,
        10,
        &[T::Lsquare.into(), e.into(), T::Rsquare.into()],
        binary("ArrayOrMapLookup"),
    );
    g.led(
        e,
        11,
        &[T::Dot.into(), T::Identifier.into()],
        binary("MemberAccess"),
    );

    for literal in [T::String, T::Boolean, T::Integer, T::Float] {
        g.nud(e, &[literal.into()], AstTransform::Substitution(0));
    }
    // `name(args)`, `name[index]` and `name.field` continue the identifier
    g.compound_nud(e, &[T::Identifier.into()], AstTransform::Substitution(0));

    let object_kvs = g.list_of(object_kv.into(), separated(T::Comma));
    g.nud(
        e,
        &[
            T::Object.into(),
            T::Lbrace.into(),
            object_kvs.into(),
            T::Rbrace.into(),
        ],
        AstTransform::node("ObjectLiteral", &[("map", 2)]),
    );
    let values = g.list_of(e.into(), separated(T::Comma));
    g.nud(
        e,
        &[T::Lsquare.into(), values.into(), T::Rsquare.into()],
        AstTransform::node("ArrayLiteral", &[("values", 1)]),
    );
    let entries = g.list_of(map_literal_kv.into(), separated(T::Comma));
    g.nud(
        e,
        &[T::Lbrace.into(), entries.into(), T::Rbrace.into()],
        AstTransform::node("MapLiteral", &[("map", 1)]),
    );
    g.nud(
        e,
        &[T::Lparen.into(), e.into(), T::Rparen.into()],
        AstTransform::Substitution(1),
    );
    g.nud(
        e,
        &[
            T::If.into(),
            e.into(),
            T::Then.into(),
            e.into(),
            T::Else.into(),
            e.into(),
        ],
        AstTransform::node("TernaryIf", &[("cond", 1), ("iftrue", 3), ("iffalse", 5)]),
    );
}

/// `Array[File]+`, `Map[String, Int]?` and plain `String`.
fn type_expression(g: &mut GrammarBuilder, type_e: NonterminalId) {
    g.expression(type_e);

    let subtypes = g.list_of(type_e.into(), separated(T::Comma));
    g.led(
        type_e,
        1,
        &[T::Lsquare.into(), subtypes.into(), T::Rsquare.into()],
        AstTransform::node("Type", &[("name", 0), ("subtype", 2)]),
    );
    g.led(
        type_e,
        2,
        &[T::Qmark.into()],
        AstTransform::node("OptionalType", &[("innerType", 0)]),
    );
    g.led(
        type_e,
        3,
        &[T::Plus.into()],
        AstTransform::node("NonEmptyType", &[("innerType", 0)]),
    );
    g.compound_nud(type_e, &[T::Type.into()], AstTransform::Substitution(0));
}
