//! Sample business data.

use rekdb_core::{Client, Machine, MachineStatus};

#[allow(clippy::too_many_arguments)]
fn client(
    name: &str,
    business_type: &str,
    owner: &str,
    address: &str,
    (city, province, postal_code): (&str, &str, &str),
    (phone, email, tax_id): (&str, &str, &str),
    (open, split, close): (&str, Option<(&str, &str)>, &str),
    closing_day: &str,
    notes: &str,
) -> Client {
    Client {
        name: name.into(),
        business_type: business_type.into(),
        owner: owner.into(),
        address: address.into(),
        city: city.into(),
        province: province.into(),
        postal_code: postal_code.into(),
        phone: phone.into(),
        email: email.into(),
        tax_id: tax_id.into(),
        morning_open_time: open.into(),
        morning_close_time: split.map(|(close, _)| close.into()),
        evening_open_time: split.map(|(_, reopen)| reopen.into()),
        evening_close_time: close.into(),
        closing_day: closing_day.into(),
        machines: 0,
        notes: Some(notes.into()),
    }
}

/// Ten valid sample clients, in seeding order.
#[must_use]
pub fn sample_clients() -> Vec<Client> {
    vec![
        client(
            "Bar El Rincón",
            "Bar",
            "Juan Pérez García",
            "Calle Principal 123",
            ("Madrid", "Madrid", "28001"),
            ("655432187", "contacto@elrincon.com", "B12345678"),
            ("10:00", Some(("16:00", "18:00")), "02:00"),
            "Lunes",
            "Local con alta rotación de clientes",
        ),
        client(
            "Cafetería Central",
            "Cafetería",
            "María García López",
            "Av. Libertad 456",
            ("Barcelona", "Barcelona", "08001"),
            ("633456789", "info@cafeteriacentral.com", "B87654321"),
            ("08:00", None, "20:00"),
            "Domingo",
            "Especialidad en desayunos y meriendas",
        ),
        client(
            "Restaurante Los Amigos",
            "Restaurante",
            "Carlos Ruiz Martínez",
            "Plaza Mayor 789",
            ("Valencia", "Valencia", "46001"),
            ("644789123", "info@losamigos.com", "B98765432"),
            ("12:00", Some(("16:00", "19:00")), "00:00"),
            "Martes",
            "Especialidad en arroces",
        ),
        client(
            "Pub Noche Loca",
            "Pub",
            "Miguel Fernández Castro",
            "Calle Fiesta 234",
            ("Sevilla", "Sevilla", "41001"),
            ("688912345", "contacto@nocheloca.com", "B43219876"),
            ("12:00", None, "04:00"),
            "Lunes",
            "Música en vivo los fines de semana",
        ),
        client(
            "Salón de Juegos Star",
            "Salón de Juegos",
            "Elena Martín Rodríguez",
            "Avenida del Juego 567",
            ("Málaga", "Málaga", "29001"),
            ("677123456", "info@salonstar.com", "B56789012"),
            ("10:00", None, "22:00"),
            "Ninguno",
            "Gran variedad de máquinas recreativas",
        ),
        client(
            "Bar Deportivo Gol",
            "Bar",
            "Alberto Sánchez Moreno",
            "Calle del Deporte 789",
            ("Bilbao", "Vizcaya", "48001"),
            ("622345678", "bargol@deportivo.com", "B23456789"),
            ("09:00", Some(("16:00", "18:00")), "01:00"),
            "Miércoles",
            "Transmisión de eventos deportivos",
        ),
        client(
            "Cafetería Dulce Aroma",
            "Cafetería",
            "Laura Torres Gil",
            "Plaza del Café 101",
            ("Zaragoza", "Zaragoza", "50001"),
            ("644567890", "info@dulcearoma.com", "B34567890"),
            ("07:00", None, "21:00"),
            "Domingo",
            "Repostería casera",
        ),
        client(
            "Centro Recreativo Diversión",
            "Centro Recreativo",
            "Javier López Navarro",
            "Avenida Central 202",
            ("Alicante", "Alicante", "03001"),
            ("655678901", "contacto@diversion.com", "B45678901"),
            ("10:00", Some(("14:00", "16:00")), "22:00"),
            "Jueves",
            "Zona para niños y adultos",
        ),
        client(
            "Restaurante El Mediterráneo",
            "Restaurante",
            "Sofía Gómez Hernández",
            "Paseo Marítimo 303",
            ("Palma de Mallorca", "Islas Baleares", "07001"),
            ("699789012", "reservas@elmediterraneo.com", "B56789012"),
            ("11:00", Some(("16:00", "19:00")), "23:00"),
            "Ninguno",
            "Especialidad en pescado fresco",
        ),
        client(
            "Pub Rock Star",
            "Pub",
            "Daniel Castro Ruiz",
            "Calle de la Música 404",
            ("Murcia", "Murcia", "30001"),
            ("611890123", "info@rockstar.com", "B67890123"),
            ("12:00", None, "03:00"),
            "Lunes",
            "Conciertos en vivo los sábados",
        ),
    ]
}

/// Three warehouse machines keyed `M001`..`M003`.
#[must_use]
pub fn sample_machines() -> Vec<(&'static str, Machine)> {
    let machine = |serial: &str, kind: &str, brand: &str, model: &str, cost: f64, counter: u64| {
        Machine {
            serial_number: serial.into(),
            kind: kind.into(),
            model: model.into(),
            brand: brand.into(),
            cost,
            status: MachineStatus::Warehouse,
            initial_counter: counter,
            current_counter: counter,
            ..Machine::default()
        }
    };
    vec![
        ("M001", machine("RF-2201", "Recreativa", "Recreativos Franco", "Cirsa Mega", 4_500.0, 1_000)),
        ("M002", machine("GR-0817", "Grúa", "Sega", "UFO Catcher", 3_200.0, 250)),
        ("M003", machine("DN-5530", "Dardos", "Radikal", "Connect", 2_800.0, 0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rekdb_core::EntityKind;

    #[test]
    fn sample_clients_are_valid() {
        let clients = sample_clients();
        assert_eq!(clients.len(), 10);
        for client in &clients {
            client.validate().unwrap();
        }
        assert_eq!(clients[0].schedule(), "10:00-16:00 y 18:00-02:00");
        assert_eq!(clients[3].schedule(), "12:00-04:00");
    }

    #[test]
    fn sample_machines_are_valid() {
        for (_, machine) in sample_machines() {
            machine.validate().unwrap();
        }
    }
}
