//! Stream to tree.
//!
//! Decoding runs in two passes. The first pass reads the stream front to
//! back, pushing expressions, statements, types and scopes straight into
//! the arena. Symbols cannot be pushed yet: a reference may come before the
//! definition it names. Every `(scope counter, name)` pair, whether met as a
//! reference or as a definition, is given a staging slot, and slot `i`
//! becomes `SymbolId(base + i)`. The second pass checks that every slot was
//! defined with the kind its references expect and commits the slots to the
//! symbol pool in order.
//!
//! A failed decode truncates the arena pools back to where they were, so no
//! half-built tree is left reachable.

use rustc_hash::FxHashMap;

use lasr_ir::asr::{
    Abi, Access, AllocArg, AsrArena, Block, BinOp, CastKind, CmpOp, Deftype, Dimension,
    DoLoopHead, ExprKind, ExprTag, ExternalSymbol, Function, Intent, LogicalOp, Module, Program,
    StmtKind, StmtTag, StorageType, Symbol, SymbolKind, TranslationUnit, Ttype, TtypeKind,
    UnitItem, Variable,
};
use lasr_ir::stack::ensure_sufficient_stack;
use lasr_ir::{
    ArenaStr, ArenaValue, ArenaVec, ExprId, Location, ScopeId, StmtId, SymbolId, TtypeId,
};

use crate::error::DecodeError;
use crate::ser::{ITEM_EXPR, ITEM_STMT, ITEM_SYMBOL, UNIT_TAG};
use crate::stream::{DefaultReader, Reader};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DeserializeOptions {
    /// Keep the scope counters found in the stream instead of drawing fresh
    /// ones. Later counters are bumped past every loaded one.
    pub load_symtab_id: bool,
}

/// Decode a unit written by [`serialize`](crate::serialize).
pub fn deserialize(
    arena: &mut AsrArena,
    bytes: &[u8],
    options: DeserializeOptions,
) -> Result<TranslationUnit, DecodeError> {
    deserialize_with(arena, DefaultReader::new(bytes), options)
}

/// Decode a unit from the given reader. The reader must hold exactly one
/// unit.
pub fn deserialize_with<'s, R: Reader<'s>>(
    arena: &mut AsrArena,
    reader: R,
    options: DeserializeOptions,
) -> Result<TranslationUnit, DecodeError> {
    let mark = arena.pool_mark();
    let base = u32::try_from(arena.symbol_count()).unwrap_or(u32::MAX);
    let mut dec = Decoder {
        arena,
        r: reader,
        options,
        base,
        slots: Vec::new(),
        slot_index: FxHashMap::default(),
        scopes: FxHashMap::default(),
        parent_fixups: Vec::new(),
        current: None,
    };
    match dec.unit().and_then(|unit| dec.commit().map(|()| unit)) {
        Ok(unit) => Ok(unit),
        Err(err) => {
            tracing::debug!(error = %err, "discarding partially decoded unit");
            dec.arena.truncate_pools(mark);
            Err(err)
        }
    }
}

/// A symbol known by address, possibly not yet defined.
struct Slot {
    counter: u64,
    name: String,
    /// Kind named by the first reference.
    referenced_as: Option<SymbolKind>,
    def: Option<(Location, Symbol)>,
}

struct Decoder<'a, R> {
    arena: &'a mut AsrArena,
    r: R,
    options: DeserializeOptions,
    base: u32,
    slots: Vec<Slot>,
    slot_index: FxHashMap<(u64, String), u32>,
    /// Serialized counter to decoded scope.
    scopes: FxHashMap<u64, ScopeId>,
    /// Variables and external symbols whose parent scope is known only by
    /// counter until every scope has been read.
    parent_fixups: Vec<(u32, u64)>,
    /// Scope whose entries are being read.
    current: Option<ScopeId>,
}

type Result<T, E = DecodeError> = std::result::Result<T, E>;

impl<'s, R: Reader<'s>> Decoder<'_, R> {
    fn unit(&mut self) -> Result<TranslationUnit> {
        let tag = self.r.read_u8("unit tag")?;
        if tag != UNIT_TAG {
            return Err(DecodeError::InvalidTag {
                category: "translation unit",
                tag,
            });
        }
        let loc = self.loc()?;
        let global = self.scope()?;
        let n = self.r.read_len("unit items")?;
        let mut items = Vec::with_capacity(n);
        for _ in 0..n {
            let item = match self.r.read_u8("unit item kind")? {
                ITEM_EXPR => UnitItem::Expr(self.expr()?),
                ITEM_STMT => UnitItem::Stmt(self.stmt()?),
                ITEM_SYMBOL => UnitItem::Symbol(self.sym_ref()?),
                tag => {
                    return Err(DecodeError::InvalidTag {
                        category: "unit item",
                        tag,
                    })
                }
            };
            items.push(item);
        }
        let remaining = self.r.remaining();
        if remaining != 0 {
            return Err(DecodeError::TrailingBytes(remaining));
        }
        let items = self.arena.new_list(&items);
        Ok(self.arena.make_translation_unit(loc, global, items))
    }

    /// Second pass: check every slot and push the symbols.
    fn commit(&mut self) -> Result<()> {
        for &(slot, counter) in &self.parent_fixups {
            let scope = *self
                .scopes
                .get(&counter)
                .ok_or(DecodeError::UnresolvedScope(counter))?;
            match self.slots[slot as usize].def.as_mut() {
                Some((_, Symbol::Variable(v))) => v.parent_symtab = scope,
                Some((_, Symbol::ExternalSymbol(e))) => e.parent_symtab = scope,
                _ => {}
            }
        }

        for slot in &self.slots {
            let Some((_, sym)) = &slot.def else {
                return Err(DecodeError::UnresolvedSymbol {
                    counter: slot.counter,
                    name: slot.name.clone(),
                });
            };
            if let Some(expected) = slot.referenced_as {
                if expected != sym.kind() {
                    return Err(DecodeError::SymbolKindMismatch {
                        counter: slot.counter,
                        name: slot.name.clone(),
                        expected: expected.name(),
                        found: sym.kind().name(),
                    });
                }
            }
        }

        for (i, slot) in std::mem::take(&mut self.slots).into_iter().enumerate() {
            if let Some((loc, sym)) = slot.def {
                let id = self.arena.add_symbol_node(loc, sym);
                debug_assert_eq!(id.index(), self.base as usize + i);
            }
        }
        tracing::debug!(
            symbols = self.slot_index.len(),
            scopes = self.scopes.len(),
            "committed decoded symbols"
        );
        Ok(())
    }

    // Slots

    fn slot(&mut self, counter: u64, name: &str) -> Result<u32> {
        if let Some(&slot) = self.slot_index.get(&(counter, name.to_owned())) {
            return Ok(slot);
        }
        let slot = u32::try_from(self.slots.len())
            .ok()
            .filter(|s| self.base.checked_add(*s).is_some_and(|id| id != u32::MAX))
            .ok_or(DecodeError::LengthOverflow {
                what: "symbols",
                count: self.slots.len() as u64,
            })?;
        self.slots.push(Slot {
            counter,
            name: name.to_owned(),
            referenced_as: None,
            def: None,
        });
        self.slot_index.insert((counter, name.to_owned()), slot);
        Ok(slot)
    }

    fn slot_symbol(&self, slot: u32) -> SymbolId {
        SymbolId::new(self.base + slot)
    }

    fn sym_ref(&mut self) -> Result<SymbolId> {
        let counter = self.r.read_u64("symbol scope")?;
        let kind = self.symbol_kind()?;
        let name = self.r.read_str("symbol name")?;
        let slot = self.slot(counter, name)?;
        let entry = &mut self.slots[slot as usize];
        match entry.referenced_as {
            None => entry.referenced_as = Some(kind),
            Some(prev) if prev != kind => {
                return Err(DecodeError::SymbolKindMismatch {
                    counter,
                    name: entry.name.clone(),
                    expected: prev.name(),
                    found: kind.name(),
                });
            }
            Some(_) => {}
        }
        Ok(self.slot_symbol(slot))
    }

    fn opt_sym_ref(&mut self) -> Result<Option<SymbolId>> {
        if self.r.read_bool("presence")? {
            self.sym_ref().map(Some)
        } else {
            Ok(None)
        }
    }

    // Leaves

    fn loc(&mut self) -> Result<Location> {
        let first = self.r.read_u32("location")?;
        let last = self.r.read_u32("location")?;
        Ok(Location::new(first, last))
    }

    fn str(&mut self, what: &'static str) -> Result<ArenaStr> {
        let s = self.r.read_str(what)?;
        Ok(self.arena.new_str(s))
    }

    fn strs(&mut self, what: &'static str) -> Result<ArenaVec<ArenaStr>> {
        let n = self.r.read_len(what)?;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.str(what)?);
        }
        Ok(self.arena.new_list(&out))
    }

    fn list<T: ArenaValue>(
        &mut self,
        what: &'static str,
        mut f: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<ArenaVec<T>> {
        let n = self.r.read_len(what)?;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(f(self)?);
        }
        Ok(self.arena.new_list(&out))
    }

    fn i32(&mut self, what: &'static str) -> Result<i32> {
        let pos = self.r.position();
        let n = self.r.read_i64(what)?;
        i32::try_from(n).map_err(|_| DecodeError::InvalidNumber { what, pos })
    }

    fn symbol_kind(&mut self) -> Result<SymbolKind> {
        let tag = self.r.read_u8("symbol tag")?;
        SymbolKind::from_tag(tag).ok_or(DecodeError::InvalidTag {
            category: "symbol",
            tag,
        })
    }

    fn tag<T>(
        &mut self,
        category: &'static str,
        from_tag: fn(u8) -> Option<T>,
    ) -> Result<T> {
        let tag = self.r.read_u8(category)?;
        from_tag(tag).ok_or(DecodeError::InvalidTag { category, tag })
    }

    fn opt_expr(&mut self) -> Result<Option<ExprId>> {
        if self.r.read_bool("presence")? {
            self.expr().map(Some)
        } else {
            Ok(None)
        }
    }

    fn exprs(&mut self) -> Result<ArenaVec<ExprId>> {
        self.list("expressions", Self::expr)
    }

    fn body(&mut self) -> Result<ArenaVec<StmtId>> {
        self.list("statements", Self::stmt)
    }

    // Scopes and symbols

    fn scope(&mut self) -> Result<ScopeId> {
        let pos = self.r.position();
        let counter = self.r.read_u64("scope counter")?;
        if self.scopes.contains_key(&counter) {
            return Err(DecodeError::DuplicateScope(counter));
        }
        let id = if self.options.load_symtab_id {
            let kept = u32::try_from(counter).map_err(|_| DecodeError::InvalidNumber {
                what: "scope counter",
                pos,
            })?;
            self.arena.new_scope_with_counter(self.current, kept)
        } else {
            self.arena.new_scope(self.current)
        };
        self.scopes.insert(counter, id);

        let n = self.r.read_len("scope entries")?;
        let outer = self.current.replace(id);
        for _ in 0..n {
            let name = self.r.read_str("symbol name")?;
            let sym = self.symbol(counter, name)?;
            if self.arena.scope_mut(id).add_symbol(name, sym).is_err() {
                return Err(DecodeError::DuplicateSymbol {
                    counter,
                    name: name.to_owned(),
                });
            }
        }
        self.current = outer;
        Ok(id)
    }

    /// Definition of the symbol held as `name` by scope `counter`.
    fn symbol(&mut self, counter: u64, name: &str) -> Result<SymbolId> {
        let kind = self.symbol_kind()?;
        let loc = self.loc()?;
        let mut parent_counter = None;
        let sym = ensure_sufficient_stack(|| -> Result<Symbol> {
            Ok(match kind {
                SymbolKind::Program => Symbol::Program(Program {
                    symtab: self.scope()?,
                    name: self.str("program name")?,
                    dependencies: self.strs("dependencies")?,
                    body: self.body()?,
                }),
                SymbolKind::Module => Symbol::Module(Module {
                    symtab: self.scope()?,
                    name: self.str("module name")?,
                    dependencies: self.strs("dependencies")?,
                    loaded_from_mod: self.r.read_bool("loaded_from_mod")?,
                    intrinsic: self.r.read_bool("intrinsic")?,
                }),
                SymbolKind::Function => Symbol::Function(Function {
                    symtab: self.scope()?,
                    name: self.str("function name")?,
                    function_signature: self.ttype()?,
                    dependencies: self.strs("dependencies")?,
                    args: self.exprs()?,
                    body: self.body()?,
                    return_var: self.opt_expr()?,
                    abi: self.tag("abi", Abi::from_tag)?,
                    access: self.tag("access", Access::from_tag)?,
                    deftype: self.tag("deftype", Deftype::from_tag)?,
                }),
                SymbolKind::Variable => {
                    parent_counter = Some(self.r.read_u64("parent scope")?);
                    Symbol::Variable(Variable {
                        parent_symtab: ScopeId::INVALID,
                        name: self.str("variable name")?,
                        dependencies: self.strs("dependencies")?,
                        intent: self.tag("intent", Intent::from_tag)?,
                        symbolic_value: self.opt_expr()?,
                        value: self.opt_expr()?,
                        storage: self.tag("storage", StorageType::from_tag)?,
                        ty: self.ttype()?,
                        abi: self.tag("abi", Abi::from_tag)?,
                        access: self.tag("access", Access::from_tag)?,
                    })
                }
                SymbolKind::ExternalSymbol => {
                    parent_counter = Some(self.r.read_u64("parent scope")?);
                    Symbol::ExternalSymbol(ExternalSymbol {
                        parent_symtab: ScopeId::INVALID,
                        name: self.str("symbol name")?,
                        external: None,
                        module_name: self.str("module name")?,
                        scope_names: self.strs("scope names")?,
                        original_name: self.str("original name")?,
                        access: self.tag("access", Access::from_tag)?,
                    })
                }
                SymbolKind::Block => Symbol::Block(Block {
                    symtab: self.scope()?,
                    name: self.str("block name")?,
                    body: self.body()?,
                }),
            })
        })?;

        let slot = self.slot(counter, name)?;
        let entry = &mut self.slots[slot as usize];
        if entry.def.is_some() {
            return Err(DecodeError::DuplicateSymbol {
                counter,
                name: name.to_owned(),
            });
        }
        entry.def = Some((loc, sym));
        if let Some(parent) = parent_counter {
            self.parent_fixups.push((slot, parent));
        }
        Ok(self.slot_symbol(slot))
    }

    // Nodes

    fn ttype(&mut self) -> Result<TtypeId> {
        let kind = self.tag("type", TtypeKind::from_tag)?;
        let loc = self.loc()?;
        let ty = match kind {
            TtypeKind::Integer => Ttype::Integer {
                kind: self.i32("type kind")?,
            },
            TtypeKind::Real => Ttype::Real {
                kind: self.i32("type kind")?,
            },
            TtypeKind::Complex => Ttype::Complex {
                kind: self.i32("type kind")?,
            },
            TtypeKind::Logical => Ttype::Logical {
                kind: self.i32("type kind")?,
            },
            TtypeKind::Character => Ttype::Character {
                kind: self.i32("type kind")?,
                len: self.r.read_i64("character length")?,
            },
            TtypeKind::Array => Ttype::Array {
                elem: self.ttype()?,
                dims: self.dims()?,
            },
            TtypeKind::Allocatable => Ttype::Allocatable {
                inner: self.ttype()?,
            },
            TtypeKind::FunctionType => Ttype::FunctionType {
                arg_types: self.list("argument types", Self::ttype)?,
                return_type: if self.r.read_bool("presence")? {
                    Some(self.ttype()?)
                } else {
                    None
                },
            },
        };
        Ok(self.arena.add_ttype(loc, ty))
    }

    fn dims(&mut self) -> Result<ArenaVec<Dimension>> {
        self.list("dimensions", |d| {
            Ok(Dimension {
                start: d.opt_expr()?,
                length: d.opt_expr()?,
            })
        })
    }

    fn head(&mut self) -> Result<DoLoopHead> {
        Ok(DoLoopHead {
            v: self.opt_expr()?,
            start: self.expr()?,
            end: self.expr()?,
            increment: self.opt_expr()?,
        })
    }

    fn stmt(&mut self) -> Result<StmtId> {
        let tag = self.tag("statement", StmtTag::from_tag)?;
        let loc = self.loc()?;
        let kind = ensure_sufficient_stack(|| -> Result<StmtKind> {
            Ok(match tag {
                StmtTag::Assignment => StmtKind::Assignment {
                    target: self.expr()?,
                    value: self.expr()?,
                },
                StmtTag::Print => StmtKind::Print {
                    values: self.exprs()?,
                },
                StmtTag::If => StmtKind::If {
                    test: self.expr()?,
                    body: self.body()?,
                    orelse: self.body()?,
                },
                StmtTag::WhileLoop => StmtKind::WhileLoop {
                    test: self.expr()?,
                    body: self.body()?,
                },
                StmtTag::DoLoop => StmtKind::DoLoop {
                    head: self.head()?,
                    body: self.body()?,
                },
                StmtTag::DoConcurrentLoop => StmtKind::DoConcurrentLoop {
                    head: self.head()?,
                    body: self.body()?,
                },
                StmtTag::ForAllSingle => StmtKind::ForAllSingle {
                    head: self.head()?,
                    assign_stmt: self.stmt()?,
                },
                StmtTag::SubroutineCall => StmtKind::SubroutineCall {
                    name: self.sym_ref()?,
                    original_name: self.opt_sym_ref()?,
                    args: self.exprs()?,
                },
                StmtTag::Return => StmtKind::Return,
                StmtTag::Exit => StmtKind::Exit,
                StmtTag::Cycle => StmtKind::Cycle,
                StmtTag::Stop => StmtKind::Stop {
                    code: self.opt_expr()?,
                },
                StmtTag::Allocate => StmtKind::Allocate {
                    args: self.list("allocate arguments", |d| {
                        Ok(AllocArg {
                            a: d.expr()?,
                            dims: d.dims()?,
                        })
                    })?,
                },
                StmtTag::ExplicitDeallocate => StmtKind::ExplicitDeallocate {
                    vars: self.exprs()?,
                },
                StmtTag::ImplicitDeallocate => StmtKind::ImplicitDeallocate {
                    vars: self.exprs()?,
                },
                StmtTag::BlockCall => StmtKind::BlockCall {
                    label: self.r.read_i64("label")?,
                    m: self.sym_ref()?,
                },
            })
        })?;
        Ok(self.arena.add_stmt(loc, kind))
    }

    fn expr(&mut self) -> Result<ExprId> {
        let tag = self.tag("expression", ExprTag::from_tag)?;
        let loc = self.loc()?;
        let kind = ensure_sufficient_stack(|| -> Result<ExprKind> {
            Ok(match tag {
                ExprTag::IntegerConstant => ExprKind::IntegerConstant {
                    n: self.r.read_i64("integer")?,
                    ty: self.ttype()?,
                },
                ExprTag::RealConstant => ExprKind::RealConstant {
                    r: self.r.read_f64("real")?,
                    ty: self.ttype()?,
                },
                ExprTag::LogicalConstant => ExprKind::LogicalConstant {
                    value: self.r.read_bool("logical")?,
                    ty: self.ttype()?,
                },
                ExprTag::StringConstant => ExprKind::StringConstant {
                    s: self.str("string")?,
                    ty: self.ttype()?,
                },
                ExprTag::IntegerBinOp => ExprKind::IntegerBinOp {
                    left: self.expr()?,
                    op: self.tag("operator", BinOp::from_tag)?,
                    right: self.expr()?,
                    ty: self.ttype()?,
                    value: self.opt_expr()?,
                },
                ExprTag::RealBinOp => ExprKind::RealBinOp {
                    left: self.expr()?,
                    op: self.tag("operator", BinOp::from_tag)?,
                    right: self.expr()?,
                    ty: self.ttype()?,
                    value: self.opt_expr()?,
                },
                ExprTag::IntegerUnaryMinus => ExprKind::IntegerUnaryMinus {
                    arg: self.expr()?,
                    ty: self.ttype()?,
                    value: self.opt_expr()?,
                },
                ExprTag::RealUnaryMinus => ExprKind::RealUnaryMinus {
                    arg: self.expr()?,
                    ty: self.ttype()?,
                    value: self.opt_expr()?,
                },
                ExprTag::IntegerCompare => ExprKind::IntegerCompare {
                    left: self.expr()?,
                    op: self.tag("comparison", CmpOp::from_tag)?,
                    right: self.expr()?,
                    ty: self.ttype()?,
                    value: self.opt_expr()?,
                },
                ExprTag::RealCompare => ExprKind::RealCompare {
                    left: self.expr()?,
                    op: self.tag("comparison", CmpOp::from_tag)?,
                    right: self.expr()?,
                    ty: self.ttype()?,
                    value: self.opt_expr()?,
                },
                ExprTag::LogicalBinOp => ExprKind::LogicalBinOp {
                    left: self.expr()?,
                    op: self.tag("logical operator", LogicalOp::from_tag)?,
                    right: self.expr()?,
                    ty: self.ttype()?,
                    value: self.opt_expr()?,
                },
                ExprTag::LogicalNot => ExprKind::LogicalNot {
                    arg: self.expr()?,
                    ty: self.ttype()?,
                    value: self.opt_expr()?,
                },
                ExprTag::Var => ExprKind::Var { v: self.sym_ref()? },
                ExprTag::FunctionCall => ExprKind::FunctionCall {
                    name: self.sym_ref()?,
                    original_name: self.opt_sym_ref()?,
                    args: self.exprs()?,
                    ty: self.ttype()?,
                    value: self.opt_expr()?,
                },
                ExprTag::ArrayItem => ExprKind::ArrayItem {
                    v: self.expr()?,
                    args: self.exprs()?,
                    ty: self.ttype()?,
                },
                ExprTag::ArrayConstant => ExprKind::ArrayConstant {
                    args: self.exprs()?,
                    ty: self.ttype()?,
                },
                ExprTag::Cast => ExprKind::Cast {
                    arg: self.expr()?,
                    kind: self.tag("cast kind", CastKind::from_tag)?,
                    ty: self.ttype()?,
                    value: self.opt_expr()?,
                },
            })
        })?;
        Ok(self.arena.add_expr(loc, kind))
    }
}
