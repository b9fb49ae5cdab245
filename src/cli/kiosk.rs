//! Terminal RSVP form for a shared device at the venue or a reception
//! desk. Posts to a running server and clears itself for the next guest.

use std::time::{Duration, Instant};

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::api::public::ErrorResponse;
use crate::api::public::rsvp::RsvpResponse;
use crate::calendar;
use crate::form::{FormError, RsvpForm};
use crate::rsvp::models::DietaryRestriction;
use crate::rsvp::validate::Field;

enum Flow {
    Continue,
    Exit,
}

/// Read a line, `None` when the user pressed Ctrl-C or Ctrl-D.
fn prompt(rl: &mut DefaultEditor, label: &str) -> Result<Option<String>> {
    match rl.readline(label) {
        Ok(line) => Ok(Some(line.trim().to_string())),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.to_lowercase().as_str() {
        "s" | "si" | "sí" | "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

fn ask_yes_no(rl: &mut DefaultEditor, label: &str) -> Result<Option<bool>> {
    loop {
        let Some(answer) = prompt(rl, label)? else {
            return Ok(None);
        };
        match parse_yes_no(&answer) {
            Some(yes) => return Ok(Some(yes)),
            None => println!("  Respondé s o n"),
        }
    }
}

fn show_error(form: &RsvpForm, field: Field) -> bool {
    match form.error(field) {
        Some(message) => {
            println!("  {}", message);
            true
        }
        None => false,
    }
}

/// Walk the guest through every field, re-asking until each one passes.
fn fill(rl: &mut DefaultEditor, form: &mut RsvpForm) -> Result<Flow> {
    loop {
        let Some(name) = prompt(rl, "Nombre: ")? else {
            return Ok(Flow::Exit);
        };
        form.set_name(&name)?;
        if !show_error(form, Field::Name) {
            break;
        }
    }

    loop {
        let label = format!("Invitados (1-10) [{}]: ", form.guests());
        let Some(guests) = prompt(rl, &label)? else {
            return Ok(Flow::Exit);
        };
        if !guests.is_empty() {
            form.set_guests(&guests)?;
        }
        if !show_error(form, Field::Guests) {
            break;
        }
    }

    loop {
        let Some(civil) = ask_yes_no(rl, "¿Asistís a la ceremonia civil? (s/n): ")? else {
            return Ok(Flow::Exit);
        };
        form.set_attend_civil(civil)?;
        let Some(lunch) = ask_yes_no(rl, "¿Asistís al almuerzo? (s/n): ")? else {
            return Ok(Flow::Exit);
        };
        form.set_attend_lunch(lunch)?;
        if !show_error(form, Field::Events) {
            break;
        }
    }

    while form.attend_lunch() {
        let options: Vec<&str> = DietaryRestriction::ALL.iter().map(|d| d.as_str()).collect();
        let label = format!("Limitaciones gastronómicas ({}) [none]: ", options.join(", "));
        let Some(answer) = prompt(rl, &label)? else {
            return Ok(Flow::Exit);
        };
        let dietary = if answer.is_empty() {
            DietaryRestriction::None
        } else {
            match answer.parse() {
                Ok(d) => d,
                Err(_) => {
                    println!("  Opción desconocida: {}", answer);
                    continue;
                }
            }
        };
        form.set_dietary(dietary)?;

        if dietary != DietaryRestriction::None {
            let Some(details) = prompt(rl, "Detalles: ")? else {
                return Ok(Flow::Exit);
            };
            form.set_dietary_details(&details)?;
        }
        if !show_error(form, Field::Dietary) {
            break;
        }
    }

    loop {
        let Some(message) = prompt(rl, "Mensaje para los novios (opcional): ")? else {
            return Ok(Flow::Exit);
        };
        form.set_message(&message)?;
        if !show_error(form, Field::Message) {
            break;
        }
    }

    Ok(Flow::Continue)
}

fn print_summary(form: &RsvpForm) {
    let yes_no = |b: bool| if b { "Sí" } else { "No" };
    println!();
    println!("Nombre:            {}", form.name());
    println!("Invitados:         {}", form.guests());
    println!("Ceremonia civil:   {}", yes_no(form.attend_civil()));
    println!("Almuerzo:          {}", yes_no(form.attend_lunch()));
    if form.attend_lunch() {
        println!("Limitaciones:      {}", form.dietary().label());
        if !form.dietary_details().is_empty() {
            println!("Detalles:          {}", form.dietary_details());
        }
    }
    if !form.message().is_empty() {
        println!("Mensaje:           {}", form.message());
    }
    println!();
}

/// Post the confirmed form. Leaves the form submitted or back in editing
/// with a notice.
async fn send(client: &reqwest::Client, endpoint: &str, form: &mut RsvpForm) -> Result<()> {
    let payload = form.confirm()?;
    let result = client.post(endpoint).json(&payload).send().await;

    let resp = match result {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!("RSVP request failed: {}", e);
            form.fail("No se pudo contactar al servidor. Por favor intenta nuevamente.")?;
            return Ok(());
        }
    };

    if resp.status().is_success() {
        let body: RsvpResponse = resp.json().await?;
        println!("¡Gracias {}! {}", body.data.nombre, body.message);
        form.succeed(Instant::now())?;
    } else {
        let status = resp.status();
        let body = resp.json::<ErrorResponse>().await.unwrap_or_else(|e| {
            tracing::warn!("Unexpected error body for status {}: {}", status, e);
            ErrorResponse::new("Error interno del servidor. Por favor intenta nuevamente.")
        });
        form.fail(&body.error)?;
        for detail in body.details.unwrap_or_default() {
            println!("  {}", detail);
        }
    }
    Ok(())
}

fn offer_calendar(rl: &mut DefaultEditor, form: &RsvpForm) -> Result<Flow> {
    let Some(wants) = ask_yes_no(rl, "¿Guardar los eventos en tu calendario? (s/n): ")? else {
        return Ok(Flow::Exit);
    };
    if wants {
        match calendar::export(form.attend_civil(), form.attend_lunch(), chrono::Utc::now()) {
            Ok(file) => {
                std::fs::write(file.file_name, file.content)?;
                println!("Calendario guardado en {}", file.file_name);
            }
            Err(e) => println!("{}", e),
        }
    }
    Ok(Flow::Continue)
}

async fn guest(
    rl: &mut DefaultEditor,
    client: &reqwest::Client,
    endpoint: &str,
    form: &mut RsvpForm,
) -> Result<Flow> {
    if let Flow::Exit = fill(rl, form)? {
        return Ok(Flow::Exit);
    }

    loop {
        match form.submit() {
            Ok(()) => {}
            Err(FormError::Invalid(_)) => {
                for message in form.errors().values() {
                    println!("  {}", message);
                }
                if let Flow::Exit = fill(rl, form)? {
                    return Ok(Flow::Exit);
                }
                continue;
            }
            Err(e) => return Err(e.into()),
        }

        print_summary(form);
        let Some(confirmed) = ask_yes_no(rl, "¿Confirmar asistencia? (s/n): ")? else {
            return Ok(Flow::Exit);
        };
        if !confirmed {
            form.cancel()?;
            if let Flow::Exit = fill(rl, form)? {
                return Ok(Flow::Exit);
            }
            continue;
        }

        send(client, endpoint, form).await?;
        if let Some(notice) = form.notice() {
            println!("{}", notice);
            let Some(retry) = ask_yes_no(rl, "¿Reintentar? (s/n): ")? else {
                return Ok(Flow::Exit);
            };
            if !retry && let Flow::Exit = fill(rl, form)? {
                return Ok(Flow::Exit);
            }
            continue;
        }

        return offer_calendar(rl, form);
    }
}

pub async fn run(server: String) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let endpoint = format!("{}/api/rsvp", server.trim_end_matches('/'));

    println!("Confirmá tu asistencia a la boda de Natalia & Jan");
    println!("(Ctrl-D para salir)");

    loop {
        let mut form = RsvpForm::new();
        println!();
        if let Flow::Exit = guest(&mut rl, &client, &endpoint, &mut form).await? {
            break;
        }

        // Leave the thank-you up for a moment, then clear for the next guest
        if let Some(deadline) = form.reset_at() {
            tokio::time::sleep_until(deadline.into()).await;
            form.tick(Instant::now());
        }
    }

    Ok(())
}
