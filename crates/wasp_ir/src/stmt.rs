use crate::expr::Expr;
use crate::ids::Id;
use crate::pos::SourcePos;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block(Vec<Stmt>),
    Return(Option<Expr>),
    Throw(Expr),
    Try {
        body: Vec<Stmt>,
        catch: Option<(Option<Id>, Vec<Stmt>)>,
        finally: Option<Vec<Stmt>>,
    },
    While { cond: Expr, body: Box<Stmt> },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    If { cond: Expr, then_branch: Box<Stmt>, else_branch: Option<Box<Stmt>> },
    Switch { discriminant: Expr, cases: Vec<(Option<Expr>, Vec<Stmt>)> },
    Break(Option<String>),
    Continue(Option<String>),
    Label { name: String, stmt: Box<Stmt> },
    ExprStmt(Expr),
    VarDecl { id: Id, init: Option<Expr> },
    WithSourcePos(SourcePos, Box<Stmt>),
}

impl Stmt {
    pub fn at(self, pos: SourcePos) -> Stmt {
        Stmt::WithSourcePos(pos, Box::new(self))
    }
}
