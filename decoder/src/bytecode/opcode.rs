//! Opcode metadata tables
//!
//! The instruction set differs between interpreter releases, so the
//! disassembler never names opcodes itself: it consults an [`OpcodeTable`]
//! passed in by the caller. [`OpcodeTable::for_version`] builds one from the
//! CPython catalogs below.

use std::borrow::Cow;
use rustc_hash::FxHashMap;
use crate::marshal::Version;

/// Catalog opcodes at or above this value are followed by two argument bytes
pub const HAVE_ARGUMENT: u8 = 90;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub mnemonic: Cow<'static, str>,
    pub has_argument: bool,
}

impl OpcodeInfo {
    pub fn new(mnemonic: impl Into<Cow<'static, str>>, has_argument: bool) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            has_argument,
        }
    }
}

/// Lookup from opcode byte to mnemonic and argument presence
#[derive(Debug, Clone, Default)]
pub struct OpcodeTable {
    entries: FxHashMap<u8, OpcodeInfo>,
    /// Argument threshold applied to bytes missing from `entries`
    have_argument: Option<u8>,
}

impl OpcodeTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from explicit entries; unlisted bytes take no argument
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u8, OpcodeInfo)>,
    {
        Self {
            entries: entries.into_iter().collect(),
            have_argument: None,
        }
    }

    /// Catalog table for the instruction set of `version`
    pub fn for_version(version: Version) -> Self {
        match (version.major, version.minor) {
            (2, _) => Self::from_catalog(CPYTHON_27, &[]),
            (3, minor) if minor >= 6 => Self::from_catalog(CPYTHON_35, CPYTHON_36_CHANGES),
            _ => Self::from_catalog(CPYTHON_35, &[]),
        }
    }

    fn from_catalog(base: &[(u8, &'static str)], changes: &[(u8, Option<&'static str>)]) -> Self {
        let mut names: FxHashMap<u8, &'static str> = base.iter().copied().collect();
        for (opcode, change) in changes {
            match change {
                Some(name) => names.insert(*opcode, *name),
                None => names.remove(opcode),
            };
        }

        Self {
            entries: names
                .into_iter()
                .map(|(opcode, name)| (opcode, OpcodeInfo::new(name, opcode >= HAVE_ARGUMENT)))
                .collect(),
            have_argument: Some(HAVE_ARGUMENT),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mnemonic for `opcode`; unlisted bytes are spelled `<N>`
    pub fn mnemonic(&self, opcode: u8) -> Cow<'_, str> {
        match self.entries.get(&opcode) {
            Some(info) => Cow::Borrowed(info.mnemonic.as_ref()),
            None => Cow::Owned(format!("<{}>", opcode)),
        }
    }

    pub fn has_argument(&self, opcode: u8) -> bool {
        match self.entries.get(&opcode) {
            Some(info) => info.has_argument,
            None => self.have_argument.is_some_and(|threshold| opcode >= threshold),
        }
    }
}

const CPYTHON_27: &[(u8, &str)] = &[
    (0, "STOP_CODE"),
    (1, "POP_TOP"),
    (2, "ROT_TWO"),
    (3, "ROT_THREE"),
    (4, "DUP_TOP"),
    (5, "ROT_FOUR"),
    (9, "NOP"),
    (10, "UNARY_POSITIVE"),
    (11, "UNARY_NEGATIVE"),
    (12, "UNARY_NOT"),
    (13, "UNARY_CONVERT"),
    (15, "UNARY_INVERT"),
    (19, "BINARY_POWER"),
    (20, "BINARY_MULTIPLY"),
    (21, "BINARY_DIVIDE"),
    (22, "BINARY_MODULO"),
    (23, "BINARY_ADD"),
    (24, "BINARY_SUBTRACT"),
    (25, "BINARY_SUBSCR"),
    (26, "BINARY_FLOOR_DIVIDE"),
    (27, "BINARY_TRUE_DIVIDE"),
    (28, "INPLACE_FLOOR_DIVIDE"),
    (29, "INPLACE_TRUE_DIVIDE"),
    (30, "SLICE+0"),
    (31, "SLICE+1"),
    (32, "SLICE+2"),
    (33, "SLICE+3"),
    (40, "STORE_SLICE+0"),
    (41, "STORE_SLICE+1"),
    (42, "STORE_SLICE+2"),
    (43, "STORE_SLICE+3"),
    (50, "DELETE_SLICE+0"),
    (51, "DELETE_SLICE+1"),
    (52, "DELETE_SLICE+2"),
    (53, "DELETE_SLICE+3"),
    (54, "STORE_MAP"),
    (55, "INPLACE_ADD"),
    (56, "INPLACE_SUBTRACT"),
    (57, "INPLACE_MULTIPLY"),
    (58, "INPLACE_DIVIDE"),
    (59, "INPLACE_MODULO"),
    (60, "STORE_SUBSCR"),
    (61, "DELETE_SUBSCR"),
    (62, "BINARY_LSHIFT"),
    (63, "BINARY_RSHIFT"),
    (64, "BINARY_AND"),
    (65, "BINARY_XOR"),
    (66, "BINARY_OR"),
    (67, "INPLACE_POWER"),
    (68, "GET_ITER"),
    (70, "PRINT_EXPR"),
    (71, "PRINT_ITEM"),
    (72, "PRINT_NEWLINE"),
    (73, "PRINT_ITEM_TO"),
    (74, "PRINT_NEWLINE_TO"),
    (75, "INPLACE_LSHIFT"),
    (76, "INPLACE_RSHIFT"),
    (77, "INPLACE_AND"),
    (78, "INPLACE_XOR"),
    (79, "INPLACE_OR"),
    (80, "BREAK_LOOP"),
    (81, "WITH_CLEANUP"),
    (82, "LOAD_LOCALS"),
    (83, "RETURN_VALUE"),
    (84, "IMPORT_STAR"),
    (85, "EXEC_STMT"),
    (86, "YIELD_VALUE"),
    (87, "POP_BLOCK"),
    (88, "END_FINALLY"),
    (89, "BUILD_CLASS"),
    (90, "STORE_NAME"),
    (91, "DELETE_NAME"),
    (92, "UNPACK_SEQUENCE"),
    (93, "FOR_ITER"),
    (94, "LIST_APPEND"),
    (95, "STORE_ATTR"),
    (96, "DELETE_ATTR"),
    (97, "STORE_GLOBAL"),
    (98, "DELETE_GLOBAL"),
    (99, "DUP_TOPX"),
    (100, "LOAD_CONST"),
    (101, "LOAD_NAME"),
    (102, "BUILD_TUPLE"),
    (103, "BUILD_LIST"),
    (104, "BUILD_SET"),
    (105, "BUILD_MAP"),
    (106, "LOAD_ATTR"),
    (107, "COMPARE_OP"),
    (108, "IMPORT_NAME"),
    (109, "IMPORT_FROM"),
    (110, "JUMP_FORWARD"),
    (111, "JUMP_IF_FALSE_OR_POP"),
    (112, "JUMP_IF_TRUE_OR_POP"),
    (113, "JUMP_ABSOLUTE"),
    (114, "POP_JUMP_IF_FALSE"),
    (115, "POP_JUMP_IF_TRUE"),
    (116, "LOAD_GLOBAL"),
    (119, "CONTINUE_LOOP"),
    (120, "SETUP_LOOP"),
    (121, "SETUP_EXCEPT"),
    (122, "SETUP_FINALLY"),
    (124, "LOAD_FAST"),
    (125, "STORE_FAST"),
    (126, "DELETE_FAST"),
    (130, "RAISE_VARARGS"),
    (131, "CALL_FUNCTION"),
    (132, "MAKE_FUNCTION"),
    (133, "BUILD_SLICE"),
    (134, "MAKE_CLOSURE"),
    (135, "LOAD_CLOSURE"),
    (136, "LOAD_DEREF"),
    (137, "STORE_DEREF"),
    (140, "CALL_FUNCTION_VAR"),
    (141, "CALL_FUNCTION_KW"),
    (142, "CALL_FUNCTION_VAR_KW"),
    (143, "SETUP_WITH"),
    (145, "EXTENDED_ARG"),
    (146, "SET_ADD"),
    (147, "MAP_ADD"),
];

const CPYTHON_35: &[(u8, &str)] = &[
    (1, "POP_TOP"),
    (2, "ROT_TWO"),
    (3, "ROT_THREE"),
    (4, "DUP_TOP"),
    (5, "DUP_TOP_TWO"),
    (9, "NOP"),
    (10, "UNARY_POSITIVE"),
    (11, "UNARY_NEGATIVE"),
    (12, "UNARY_NOT"),
    (15, "UNARY_INVERT"),
    (16, "BINARY_MATRIX_MULTIPLY"),
    (17, "INPLACE_MATRIX_MULTIPLY"),
    (19, "BINARY_POWER"),
    (20, "BINARY_MULTIPLY"),
    (22, "BINARY_MODULO"),
    (23, "BINARY_ADD"),
    (24, "BINARY_SUBTRACT"),
    (25, "BINARY_SUBSCR"),
    (26, "BINARY_FLOOR_DIVIDE"),
    (27, "BINARY_TRUE_DIVIDE"),
    (28, "INPLACE_FLOOR_DIVIDE"),
    (29, "INPLACE_TRUE_DIVIDE"),
    (50, "GET_AITER"),
    (51, "GET_ANEXT"),
    (52, "BEFORE_ASYNC_WITH"),
    (55, "INPLACE_ADD"),
    (56, "INPLACE_SUBTRACT"),
    (57, "INPLACE_MULTIPLY"),
    (59, "INPLACE_MODULO"),
    (60, "STORE_SUBSCR"),
    (61, "DELETE_SUBSCR"),
    (62, "BINARY_LSHIFT"),
    (63, "BINARY_RSHIFT"),
    (64, "BINARY_AND"),
    (65, "BINARY_XOR"),
    (66, "BINARY_OR"),
    (67, "INPLACE_POWER"),
    (68, "GET_ITER"),
    (69, "GET_YIELD_FROM_ITER"),
    (70, "PRINT_EXPR"),
    (71, "LOAD_BUILD_CLASS"),
    (72, "YIELD_FROM"),
    (73, "GET_AWAITABLE"),
    (75, "INPLACE_LSHIFT"),
    (76, "INPLACE_RSHIFT"),
    (77, "INPLACE_AND"),
    (78, "INPLACE_XOR"),
    (79, "INPLACE_OR"),
    (80, "BREAK_LOOP"),
    (81, "WITH_CLEANUP_START"),
    (82, "WITH_CLEANUP_FINISH"),
    (83, "RETURN_VALUE"),
    (84, "IMPORT_STAR"),
    (86, "YIELD_VALUE"),
    (87, "POP_BLOCK"),
    (88, "END_FINALLY"),
    (89, "POP_EXCEPT"),
    (90, "STORE_NAME"),
    (91, "DELETE_NAME"),
    (92, "UNPACK_SEQUENCE"),
    (93, "FOR_ITER"),
    (94, "UNPACK_EX"),
    (95, "STORE_ATTR"),
    (96, "DELETE_ATTR"),
    (97, "STORE_GLOBAL"),
    (98, "DELETE_GLOBAL"),
    (100, "LOAD_CONST"),
    (101, "LOAD_NAME"),
    (102, "BUILD_TUPLE"),
    (103, "BUILD_LIST"),
    (104, "BUILD_SET"),
    (105, "BUILD_MAP"),
    (106, "LOAD_ATTR"),
    (107, "COMPARE_OP"),
    (108, "IMPORT_NAME"),
    (109, "IMPORT_FROM"),
    (110, "JUMP_FORWARD"),
    (111, "JUMP_IF_FALSE_OR_POP"),
    (112, "JUMP_IF_TRUE_OR_POP"),
    (113, "JUMP_ABSOLUTE"),
    (114, "POP_JUMP_IF_FALSE"),
    (115, "POP_JUMP_IF_TRUE"),
    (116, "LOAD_GLOBAL"),
    (119, "CONTINUE_LOOP"),
    (120, "SETUP_LOOP"),
    (121, "SETUP_EXCEPT"),
    (122, "SETUP_FINALLY"),
    (124, "LOAD_FAST"),
    (125, "STORE_FAST"),
    (126, "DELETE_FAST"),
    (130, "RAISE_VARARGS"),
    (131, "CALL_FUNCTION"),
    (132, "MAKE_FUNCTION"),
    (133, "BUILD_SLICE"),
    (134, "MAKE_CLOSURE"),
    (135, "LOAD_CLOSURE"),
    (136, "LOAD_DEREF"),
    (137, "STORE_DEREF"),
    (138, "DELETE_DEREF"),
    (140, "CALL_FUNCTION_VAR"),
    (141, "CALL_FUNCTION_KW"),
    (142, "CALL_FUNCTION_VAR_KW"),
    (143, "SETUP_WITH"),
    (144, "EXTENDED_ARG"),
    (145, "LIST_APPEND"),
    (146, "SET_ADD"),
    (147, "MAP_ADD"),
    (148, "LOAD_CLASSDEREF"),
    (149, "BUILD_LIST_UNPACK"),
    (150, "BUILD_MAP_UNPACK"),
    (151, "BUILD_MAP_UNPACK_WITH_CALL"),
    (152, "BUILD_TUPLE_UNPACK"),
    (153, "BUILD_SET_UNPACK"),
    (154, "SETUP_ASYNC_WITH"),
];

/// Differences between the 3.5 and 3.6 instruction sets; `None` removes an opcode
const CPYTHON_36_CHANGES: &[(u8, Option<&str>)] = &[
    (85, Some("SETUP_ANNOTATIONS")),
    (127, Some("STORE_ANNOTATION")),
    (134, None),
    (140, None),
    (142, Some("CALL_FUNCTION_EX")),
    (155, Some("FORMAT_VALUE")),
    (156, Some("BUILD_CONST_KEY_MAP")),
    (157, Some("BUILD_STRING")),
    (158, Some("BUILD_TUPLE_UNPACK_WITH_CALL")),
];
