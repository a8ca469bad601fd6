pub mod calc;
pub mod calculator;
pub mod notepad;
pub mod paint;

use crate::windows::{AppDescriptor, WindowApp};

pub fn builtin_apps() -> &'static [AppDescriptor] {
    BUILTIN_APPS
}

const BUILTIN_APPS: &[AppDescriptor] = &[
    AppDescriptor {
        label: "Notepad",
        default_title: "Notepad",
        width: notepad::WIDTH,
        height: notepad::HEIGHT,
        factory: create_notepad,
    },
    AppDescriptor {
        label: "Calculator",
        default_title: "Calculator",
        width: calculator::WIDTH,
        height: calculator::HEIGHT,
        factory: create_calculator,
    },
    AppDescriptor {
        label: "Paint",
        default_title: "Paint",
        width: paint::WIDTH,
        height: paint::HEIGHT,
        factory: create_paint,
    },
];

fn create_notepad() -> Box<dyn WindowApp> {
    Box::new(notepad::NotepadApp::new())
}

fn create_calculator() -> Box<dyn WindowApp> {
    Box::new(calculator::CalculatorApp::new())
}

fn create_paint() -> Box<dyn WindowApp> {
    Box::new(paint::PaintApp::new())
}
