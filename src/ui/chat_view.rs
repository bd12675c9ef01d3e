use egui::RichText;

use crate::assistant::ChatRole;

use super::{PALETTE_AMBER, PALETTE_GRAY, PitwallApp};

impl PitwallApp {
    pub(crate) fn chat_view(&mut self, ui: &mut egui::Ui) {
        ui.heading("Radio");
        ui.separator();

        let input_height = 32.;
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .max_height(ui.available_height() - input_height)
            .show(ui, |ui| {
                if self.chat_log.is_empty() {
                    ui.label(
                        RichText::new("Ask the engineer anything about the race.")
                            .color(PALETTE_GRAY),
                    );
                }
                for message in self.chat_log.messages() {
                    match message.role {
                        ChatRole::Driver => {
                            ui.label(RichText::new(format!("DRIVER  {}", message.text)).strong());
                        }
                        ChatRole::Engineer => {
                            ui.label(&message.text);
                            if message.audio.is_some() {
                                ui.label(
                                    RichText::new("voice message attached")
                                        .size(10.)
                                        .color(PALETTE_AMBER),
                                );
                            }
                        }
                    }
                    ui.add_space(4.);
                }
                if self.chat_pending.is_some() {
                    ui.label(RichText::new("engineer is typing...").color(PALETTE_GRAY));
                }
            });

        ui.separator();
        ui.horizontal(|ui| {
            let edit = ui.text_edit_singleline(&mut self.chat_input);
            let submitted =
                edit.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
            if ui.button("Send").clicked() || submitted {
                self.send_chat_query();
                edit.request_focus();
            }
        });
    }
}
