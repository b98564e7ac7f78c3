//! Scope chain for nested query blocks

use crate::ast::WithClause;
use crate::set_operation::QueryStatement;
use std::collections::HashMap;
use std::sync::Arc;

/// Views visible to a query block. Each operand of a union analyzes in its
/// own child scope; scopes are never mutated once shared.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// Level in the scope hierarchy (0 = outermost)
    level: usize,
    /// Views introduced at this level, keyed by lowercase name
    views: HashMap<String, QueryStatement>,
    /// Parent scope
    parent: Option<Arc<Scope>>,
}

impl Scope {
    /// The outermost scope, with no views
    pub fn root() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A child scope with no views of its own
    pub fn child(parent: &Arc<Scope>) -> Arc<Self> {
        Arc::new(Self {
            level: parent.level + 1,
            views: HashMap::new(),
            parent: Some(Arc::clone(parent)),
        })
    }

    /// A child scope introducing the views of a WITH clause. A later view
    /// with the same name shadows an earlier one.
    pub fn with_views(parent: &Arc<Scope>, with: &WithClause) -> Arc<Self> {
        let views = with
            .views
            .iter()
            .map(|view| (view.name.to_lowercase(), view.query.clone_unanalyzed()))
            .collect();
        Arc::new(Self {
            level: parent.level + 1,
            views,
            parent: Some(Arc::clone(parent)),
        })
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn parent(&self) -> Option<&Arc<Scope>> {
        self.parent.as_ref()
    }

    /// Find a view by name, innermost scope first.
    pub fn lookup_view(&self, name: &str) -> Option<&QueryStatement> {
        let key = name.to_lowercase();
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(view) = current.views.get(&key) {
                return Some(view);
            }
            scope = current.parent.as_deref();
        }
        None
    }
}
