pub mod web_buttons;
