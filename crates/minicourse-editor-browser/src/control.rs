use std::cell::RefCell;

use web_sys::Element;

use minicourse_editor_core::TriggerControl;

/// What a control looked like before it went busy.
struct Resting {
    html: String,
    disabled: bool,
}

/// A clicked button (or `.btn` link), disabled with a spinner while its
/// request runs.
pub struct ButtonControl {
    button: Element,
    resting: RefCell<Option<Resting>>,
}

impl ButtonControl {
    pub fn new(button: Element) -> Self {
        Self {
            button,
            resting: RefCell::new(None),
        }
    }
}

impl TriggerControl for ButtonControl {
    fn set_busy(&self, label: &str) {
        self.resting.borrow_mut().get_or_insert_with(|| Resting {
            html: self.button.inner_html(),
            disabled: self.button.has_attribute("disabled"),
        });
        let _ = self.button.set_attribute("disabled", "");
        self.button.set_inner_html(&format!(
            "<span class=\"spinner-border spinner-border-sm\" role=\"status\" \
             aria-hidden=\"true\"></span> {label}"
        ));
    }

    fn restore(&self) {
        let Some(resting) = self.resting.borrow_mut().take() else {
            return;
        };
        if !resting.disabled {
            let _ = self.button.remove_attribute("disabled");
        }
        self.button.set_inner_html(&resting.html);
    }
}
