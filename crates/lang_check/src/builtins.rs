// ==============================================================================
// Builtin Environment
// ==============================================================================
//
// Every builtin is a closed scheme, so each use instantiates its own copy of
// the type variables. The `builtins` attrset is in the environment as a single
// open record scheme; `builtins.foo` instantiates the field through that
// scheme. The common builtins are also bound globally.

use std::collections::BTreeMap;

use lang_ty::{AttrSetTy, Scheme, Ty, ty};
use smol_str::SmolStr;

use crate::env::Env;

/// All builtin names that appear as fields of the `builtins` attrset.
const ALL_BUILTIN_NAMES: &[&str] = &[
    // type predicates and simple functions
    "isAttrs",
    "isBool",
    "isFloat",
    "isFunction",
    "isInt",
    "isList",
    "isNull",
    "isPath",
    "isString",
    "typeOf",
    "head",
    "tail",
    "length",
    "elemAt",
    "elem",
    "stringLength",
    "substring",
    "ceil",
    "floor",
    "toString",
    "toJSON",
    "fromJSON",
    "fromTOML",
    "seq",
    "deepSeq",
    "trace",
    "throw",
    "abort",
    "import",
    "attrNames",
    "attrValues",
    "hasAttr",
    "getAttr",
    "getEnv",
    "pathExists",
    "readFile",
    "baseNameOf",
    "dirOf",
    "concatStringsSep",
    "derivation",
    // higher-order list and attrset operations
    "map",
    "filter",
    "foldl'",
    "genList",
    "concatLists",
    "concatMap",
    "sort",
    "all",
    "any",
    "partition",
    "mapAttrs",
    "tryEval",
    "functionArgs",
    "listToAttrs",
    "removeAttrs",
    // value constants
    "langVersion",
    "nixVersion",
    "currentSystem",
    "currentTime",
    "storeDir",
];

/// Builtins that are also in scope without the `builtins.` prefix.
const GLOBAL_NAMES: &[&str] = &[
    "abort",
    "baseNameOf",
    "derivation",
    "dirOf",
    "import",
    "isNull",
    "map",
    "removeAttrs",
    "throw",
    "toString",
];

/// The type of a builtin, with its variables still free.
fn builtin_ty(name: &str) -> Option<Ty> {
    let ty = match name {
        // a -> bool
        "isAttrs" | "isBool" | "isFloat" | "isFunction" | "isInt" | "isList" | "isNull"
        | "isPath" | "isString" | "pathExists" => ty!((# 0) -> Bool),

        // a -> string
        "typeOf" | "toString" | "toJSON" | "readFile" | "baseNameOf" => ty!((# 0) -> String),

        // string -> a
        "fromJSON" | "fromTOML" | "throw" | "abort" => ty!(String -> (# 0)),

        "head" => ty!([(# 0)] -> (# 0)),
        "tail" => ty!([(# 0)] -> [(# 0)]),
        // any list, the elements are never looked at
        "length" => ty!([] -> Int),
        "elemAt" => ty!([(# 0)] -> Int -> (# 0)),
        "elem" => ty!((# 0) -> [(# 0)] -> Bool),

        "stringLength" => ty!(String -> Int),
        "substring" => ty!(Int -> Int -> String -> String),
        "getEnv" => ty!(String -> String),
        "concatStringsSep" => ty!(String -> [String] -> String),
        "dirOf" => Ty::overload([ty!(Path -> Path), ty!(String -> String)]),

        "ceil" | "floor" => Ty::overload([ty!(Float -> Int), ty!(Int -> Int)]),

        // a -> b -> b
        "seq" | "deepSeq" | "trace" => ty!((# 0) -> (# 1) -> (# 1)),

        "import" => ty!((# 0) -> (# 1)),

        "attrNames" => ty!({ ... } -> [String]),
        "attrValues" => ty!({ ... } -> []),
        "hasAttr" => ty!(String -> { ... } -> Bool),
        "getAttr" => ty!(String -> { ... } -> (# 0)),
        "derivation" => ty!({ ... } -> { ... }),

        "map" => ty!(((# 0) -> (# 1)) -> [(# 0)] -> [(# 1)]),
        "filter" => ty!(((# 0) -> Bool) -> [(# 0)] -> [(# 0)]),
        "foldl'" => ty!(((# 0) -> (# 1) -> (# 0)) -> (# 0) -> [(# 1)] -> (# 0)),
        "genList" => ty!((Int -> (# 0)) -> Int -> [(# 0)]),
        "concatLists" => ty!([[(# 0)]] -> [(# 0)]),
        "concatMap" => ty!(((# 0) -> [(# 1)]) -> [(# 0)] -> [(# 1)]),
        "sort" => ty!(((# 0) -> (# 0) -> Bool) -> [(# 0)] -> [(# 0)]),
        "all" | "any" => ty!(((# 0) -> Bool) -> [(# 0)] -> Bool),
        "partition" => ty!(
            ((# 0) -> Bool) -> [(# 0)] -> { "right": [(# 0)], "wrong": [(# 0)] }
        ),
        "mapAttrs" => ty!((String -> (# 0) -> (# 1)) -> { ... } -> { ... }),
        "tryEval" => ty!((# 0) -> { "success": Bool, "value": (# 0) }),
        "functionArgs" => ty!(((# 0) -> (# 1)) -> { ... }),
        "listToAttrs" => ty!([] -> { ... }),
        "removeAttrs" => ty!({ ... } -> [String] -> { ... }),

        "langVersion" | "currentTime" => ty!(Int),
        "nixVersion" | "currentSystem" | "storeDir" => ty!(String),

        _ => return None,
    };
    Some(ty)
}

/// The environment every file starts from.
pub fn builtin_env() -> Env {
    let fields: BTreeMap<SmolStr, Ty> = ALL_BUILTIN_NAMES
        .iter()
        .filter_map(|&name| builtin_ty(name).map(|ty| (SmolStr::from(name), ty)))
        .collect();

    let mut env = Env::new();
    for &name in GLOBAL_NAMES {
        if let Some(ty) = fields.get(name) {
            env.extend(name, vec![Scheme::close_over(ty.clone())]);
        }
    }
    // open: builtins not modeled here are still accessible
    env.extend(
        "builtins",
        vec![Scheme::close_over(Ty::AttrSet(AttrSetTy::open(fields)))],
    );
    env
}
