use std::fmt::Display;

use jcc_grammar::resolve_package;

/// Node files land next to the parser by default, in a `.node` sub-package
/// resolved against the grammar's own declared package.
pub const DEFAULT_NODE_PACKAGE: &str = "*.node";

/// Generator option set. Every field is tri-state: `None` means the option
/// is not passed at all, so the tool's own default (or a directive inside
/// the grammar file) stays in effect. An explicit `Some(false)` is
/// observably different from `None` to the wrapped tool.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub jdk_version: Option<String>,
    pub static_parser: Option<bool>,
    pub lookahead: Option<u32>,
    pub choice_ambiguity_check: Option<u32>,
    pub other_ambiguity_check: Option<u32>,
    pub debug_parser: Option<bool>,
    pub debug_lookahead: Option<bool>,
    pub debug_token_manager: Option<bool>,
    pub error_reporting: Option<bool>,
    pub java_unicode_escape: Option<bool>,
    pub unicode_input: Option<bool>,
    pub ignore_case: Option<bool>,
    pub common_token_action: Option<bool>,
    pub user_token_manager: Option<bool>,
    pub user_char_stream: Option<bool>,
    pub build_parser: Option<bool>,
    pub build_token_manager: Option<bool>,
    pub token_manager_uses_parser: Option<bool>,
    pub sanity_check: Option<bool>,
    pub force_la_check: Option<bool>,
    pub cache_tokens: Option<bool>,
    pub keep_line_column: Option<bool>,
}

impl PipelineOptions {
    /// Options understood by both tools.
    pub(crate) fn push_shared_args(&self, args: &mut Vec<String>) {
        push_option(args, "JDK_VERSION", &self.jdk_version);
        push_option(args, "STATIC", &self.static_parser);
    }

    /// Options understood by the parser generator only.
    pub(crate) fn push_parser_args(&self, args: &mut Vec<String>) {
        push_option(args, "LOOKAHEAD", &self.lookahead);
        push_option(args, "CHOICE_AMBIGUITY_CHECK", &self.choice_ambiguity_check);
        push_option(args, "OTHER_AMBIGUITY_CHECK", &self.other_ambiguity_check);
        push_option(args, "DEBUG_PARSER", &self.debug_parser);
        push_option(args, "DEBUG_LOOKAHEAD", &self.debug_lookahead);
        push_option(args, "DEBUG_TOKEN_MANAGER", &self.debug_token_manager);
        push_option(args, "ERROR_REPORTING", &self.error_reporting);
        push_option(args, "JAVA_UNICODE_ESCAPE", &self.java_unicode_escape);
        push_option(args, "UNICODE_INPUT", &self.unicode_input);
        push_option(args, "IGNORE_CASE", &self.ignore_case);
        push_option(args, "COMMON_TOKEN_ACTION", &self.common_token_action);
        push_option(args, "USER_TOKEN_MANAGER", &self.user_token_manager);
        push_option(args, "USER_CHAR_STREAM", &self.user_char_stream);
        push_option(args, "BUILD_PARSER", &self.build_parser);
        push_option(args, "BUILD_TOKEN_MANAGER", &self.build_token_manager);
        push_option(
            args,
            "TOKEN_MANAGER_USES_PARSER",
            &self.token_manager_uses_parser,
        );
        push_option(args, "SANITY_CHECK", &self.sanity_check);
        push_option(args, "FORCE_LA_CHECK", &self.force_la_check);
        push_option(args, "CACHE_TOKENS", &self.cache_tokens);
        push_option(args, "KEEP_LINE_COLUMN", &self.keep_line_column);
    }
}

/// Tree-preprocessor option set, same tri-state rule as [`PipelineOptions`].
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    pub build_node_files: Option<bool>,
    pub multi: Option<bool>,
    pub node_default_void: Option<bool>,
    pub node_factory: Option<bool>,
    /// Package for generated node files; a leading `*` is substituted with
    /// the grammar's declared package before the tool sees it.
    pub node_package: Option<String>,
    pub node_prefix: Option<String>,
    pub node_scope_hook: Option<bool>,
    pub node_uses_parser: Option<bool>,
    pub visitor: Option<bool>,
    pub visitor_exception: Option<String>,
}

impl TreeOptions {
    pub(crate) fn push_args(&self, args: &mut Vec<String>) {
        push_option(args, "BUILD_NODE_FILES", &self.build_node_files);
        push_option(args, "MULTI", &self.multi);
        push_option(args, "NODE_DEFAULT_VOID", &self.node_default_void);
        push_option(args, "NODE_FACTORY", &self.node_factory);
        push_option(args, "NODE_PACKAGE", &self.node_package);
        push_option(args, "NODE_PREFIX", &self.node_prefix);
        push_option(args, "NODE_SCOPE_HOOK", &self.node_scope_hook);
        push_option(args, "NODE_USES_PARSER", &self.node_uses_parser);
        push_option(args, "VISITOR", &self.visitor);
        push_option(args, "VISITOR_EXCEPTION", &self.visitor_exception);
    }

    /// The node package for a grammar with the given declared package,
    /// after wildcard substitution. Defaults to [`DEFAULT_NODE_PACKAGE`].
    pub fn effective_node_package(&self, declared_package: &str) -> String {
        let configured = self.node_package.as_deref().unwrap_or(DEFAULT_NODE_PACKAGE);
        resolve_package(configured, declared_package)
    }
}

fn push_option<T: Display>(args: &mut Vec<String>, name: &str, value: &Option<T>) {
    if let Some(value) = value {
        args.push(format!("-{}={}", name, value));
    }
}
