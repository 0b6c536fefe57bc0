use cranelift_entity::EntityRef;

use super::{NonterminalId, RuleId, TerminalId};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum InsertError {
    /// The cell already holds another rule.
    Conflict(RuleId),
    OutOfRange,
}

/// Dense LL(1) prediction table, one row per nonterminal.
pub(crate) struct PredictiveTable {
    width: usize,
    cells: Vec<Option<RuleId>>,
}

impl PredictiveTable {
    pub fn new(nonterminals: usize, terminals: usize) -> PredictiveTable {
        PredictiveTable {
            width: terminals,
            cells: vec![None; nonterminals * terminals],
        }
    }

    fn cell(&self, nonterminal: NonterminalId, terminal: TerminalId) -> Option<usize> {
        if terminal.index() >= self.width {
            return None;
        }
        let index = nonterminal.index() * self.width + terminal.index();
        if index >= self.cells.len() {
            return None;
        }
        Some(index)
    }

    pub fn get(&self, nonterminal: NonterminalId, terminal: TerminalId) -> Option<RuleId> {
        self.cell(nonterminal, terminal)
            .and_then(|index| self.cells[index])
    }

    /// Fills the cell, failing on a cell outside the table or one occupied
    /// by a different rule.
    pub fn insert(
        &mut self,
        nonterminal: NonterminalId,
        terminal: TerminalId,
        rule: RuleId,
    ) -> Result<(), InsertError> {
        let Some(index) = self.cell(nonterminal, terminal) else {
            return Err(InsertError::OutOfRange);
        };
        match self.cells[index] {
            Some(existing) if existing != rule => Err(InsertError::Conflict(existing)),
            _ => {
                self.cells[index] = Some(rule);
                Ok(())
            }
        }
    }
}

#[test]
fn test_table_bounds() {
    let mut table = PredictiveTable::new(2, 3);
    let a = NonterminalId::new(1);

    assert_eq!(table.insert(a, TerminalId::new(2), RuleId::new(5)), Ok(()));
    assert_eq!(table.get(a, TerminalId::new(2)), Some(RuleId::new(5)));
    assert_eq!(table.get(a, TerminalId::new(1)), None);
    assert_eq!(table.get(a, TerminalId::new(7)), None);

    assert_eq!(
        table.insert(a, TerminalId::new(2), RuleId::new(6)),
        Err(InsertError::Conflict(RuleId::new(5)))
    );
    assert_eq!(table.insert(a, TerminalId::new(2), RuleId::new(5)), Ok(()));

    assert_eq!(
        table.insert(a, TerminalId::new(3), RuleId::new(1)),
        Err(InsertError::OutOfRange)
    );
    assert_eq!(
        table.insert(NonterminalId::new(2), TerminalId::new(0), RuleId::new(1)),
        Err(InsertError::OutOfRange)
    );
    assert_eq!(table.get(a, TerminalId::new(3)), None);
}
