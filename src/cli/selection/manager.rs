use std::fmt::Display;

use crate::cli::console::{Console, ConsoleError, MenuOption, Prompted};
use crate::cli::selectors::{SelectionOutcome, SelectionProvider};

/// Runs a provider's items through the console's single-selection menu.
pub struct SelectionManager<P: SelectionProvider> {
    provider: P,
}

impl<P> SelectionManager<P>
where
    P: SelectionProvider,
    P::Id: Clone + PartialEq + Display,
{
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Pre-selects `default` when it is one of the items.
    pub fn choose(
        self,
        console: &mut dyn Console,
        default: Option<&P::Id>,
    ) -> Result<SelectionOutcome<P::Id>, ConsoleError> {
        let items = self.provider.items();
        if items.is_empty() {
            return Ok(SelectionOutcome::Empty);
        }

        let options: Vec<MenuOption> = items
            .iter()
            .map(|item| MenuOption::new(item.id.to_string(), item.label.clone()))
            .collect();
        let preselected = default.and_then(|id| items.iter().position(|item| &item.id == id));

        match console.select(&self.provider.prompt(), &options, preselected)? {
            Prompted::Value(index) => match items.get(index) {
                Some(item) => Ok(SelectionOutcome::Selected(item.id.clone())),
                None => Ok(SelectionOutcome::Cancelled),
            },
            Prompted::Interrupted => Ok(SelectionOutcome::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::script::ScriptedConsole;
    use crate::cli::selectors::SelectionItem;

    struct Fixed(Vec<(u32, &'static str)>);

    impl SelectionProvider for Fixed {
        type Id = u32;

        fn prompt(&self) -> String {
            "Pick one".into()
        }

        fn items(&self) -> Vec<SelectionItem<u32>> {
            self.0
                .iter()
                .map(|(id, label)| SelectionItem::new(*id, *label))
                .collect()
        }
    }

    #[test]
    fn empty_provider_reports_empty() {
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        let outcome = SelectionManager::new(Fixed(vec![]))
            .choose(&mut console, None)
            .expect("choose");
        assert_eq!(outcome, SelectionOutcome::Empty);
    }

    #[test]
    fn default_is_preselected() {
        let mut console = ScriptedConsole::new([""]);
        let outcome = SelectionManager::new(Fixed(vec![(7, "a"), (9, "b")]))
            .choose(&mut console, Some(&9))
            .expect("choose");
        assert_eq!(outcome, SelectionOutcome::Selected(9));
    }

    #[test]
    fn interrupt_cancels() {
        let mut console = ScriptedConsole::new(["<INTERRUPT>"]);
        let outcome = SelectionManager::new(Fixed(vec![(7, "a")]))
            .choose(&mut console, None)
            .expect("choose");
        assert_eq!(outcome, SelectionOutcome::Cancelled);
    }
}
