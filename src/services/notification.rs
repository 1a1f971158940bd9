//! Builds the operator notification for a persisted order: an HTML +
//! plain-text message body and, in extended mode, a spreadsheet attachment
//! summarizing the line items.

use crate::errors::AppError;
use crate::models::Order;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook};
use tracing::instrument;

/// Excel caps worksheet names at 31 characters.
const MAX_SHEET_NAME_LEN: usize = 31;

const CURRENCY_SUFFIX: &str = "₽";

#[derive(Debug, Clone)]
pub struct MessageBody {
  pub subject: String,
  pub html: String,
  pub text: String,
}

#[derive(Debug, Clone)]
pub struct SpreadsheetAttachment {
  pub filename: String,
  pub bytes: Vec<u8>,
}

/// Renders a money amount rounded to 2 decimals with trailing zeros
/// trimmed. `100 ₽` and `99.5 ₽`, not `100.00 ₽`.
pub fn format_money(amount: f64) -> String {
  let fixed = format!("{:.2}", round2(amount));
  fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn round2(amount: f64) -> f64 {
  (amount * 100.0).round() / 100.0
}

fn escape_html(s: &str) -> String {
  s.replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('"', "&quot;")
}

/// Builds the HTML and plain-text renderings of the order notification.
/// Pure string assembly; cannot fail.
#[instrument(name = "notification::compose_message", skip(order), fields(order_id = %order.id))]
pub fn compose_message(order: &Order) -> MessageBody {
  let customer = &order.customer_info.0;
  let subject = format!("Новый заказ №{}", order.order_number);
  let timestamp = order.created_at.format("%d.%m.%Y %H:%M");

  let mut items_html = String::new();
  let mut items_text = String::new();
  for line in order.items.0.iter() {
    items_html.push_str(&format!(
      "<li>{} — {} × {} {suffix} = {} {suffix}</li>",
      escape_html(&line.product.name),
      line.quantity,
      format_money(line.product.price),
      format_money(line.line_total()),
      suffix = CURRENCY_SUFFIX,
    ));
    items_text.push_str(&format!(
      "- {} — {} × {} {suffix} = {} {suffix}\n",
      line.product.name,
      line.quantity,
      format_money(line.product.price),
      format_money(line.line_total()),
      suffix = CURRENCY_SUFFIX,
    ));
  }

  let comment_html = match &customer.comment {
    Some(comment) if !comment.trim().is_empty() => {
      format!("<p><strong>Комментарий:</strong> {}</p>", escape_html(comment))
    }
    _ => String::new(),
  };

  let html = format!(
    "<h2>Новый заказ №{number}</h2>\
     <p><strong>Клиент:</strong> {name}, {phone}, {email}</p>\
     <p><strong>Город:</strong> {city}</p>\
     {comment}\
     <h3>Товары:</h3>\
     <ul>{items}</ul>\
     <p><strong>Итог:</strong> {total} {suffix}</p>\
     <p>Время заказа: {timestamp}</p>",
    number = order.order_number,
    name = escape_html(&customer.name),
    phone = escape_html(&customer.phone),
    email = escape_html(&customer.email),
    city = escape_html(&customer.city),
    comment = comment_html,
    items = items_html,
    total = format_money(order.total_price),
    suffix = CURRENCY_SUFFIX,
    timestamp = timestamp,
  );

  let mut text = format!(
    "Новый заказ №{}\nКлиент: {}, {}, {}\nГород: {}\n",
    order.order_number, customer.name, customer.phone, customer.email, customer.city
  );
  if let Some(comment) = customer.comment.as_deref().filter(|c| !c.trim().is_empty()) {
    text.push_str(&format!("Комментарий: {}\n", comment));
  }
  text.push_str("Товары:\n");
  text.push_str(&items_text);
  text.push_str(&format!(
    "Итог: {} {}\nВремя заказа: {}\n",
    format_money(order.total_price),
    CURRENCY_SUFFIX,
    timestamp
  ));

  MessageBody { subject, html, text }
}

/// Worksheet title derived from the order id, cut to the sheet-name limit.
fn sheet_title(order: &Order) -> String {
  let title = order.id.to_string();
  title.chars().take(MAX_SHEET_NAME_LEN).collect()
}

/// Builds the spreadsheet attachment: a header row, one row per line item
/// with `price × quantity` rounded to 2 decimals, a merged totals row, and a
/// merged customer-info block below the item table.
///
/// Failure here is isolated by the caller: a composition error degrades the
/// notification, never the order.
#[instrument(name = "notification::compose_spreadsheet", skip(order), fields(order_id = %order.id))]
pub fn compose_spreadsheet(order: &Order) -> Result<SpreadsheetAttachment, AppError> {
  let customer = &order.customer_info.0;
  let mut workbook = Workbook::new();

  let header_format = Format::new()
    .set_bold()
    .set_align(FormatAlign::Center)
    .set_border(FormatBorder::Thin);
  let cell_format = Format::new().set_border(FormatBorder::Thin);
  let money_format = Format::new().set_border(FormatBorder::Thin).set_num_format("0.00");
  let totals_format = Format::new().set_bold().set_align(FormatAlign::Right);
  let bold_format = Format::new().set_bold();

  let to_app_err = |e: rust_xlsxwriter::XlsxError| AppError::Internal(format!("Spreadsheet generation failed: {}", e));

  let sheet = workbook.add_worksheet();
  sheet.set_name(sheet_title(order)).map_err(to_app_err)?;

  let columns = ["№", "Артикул", "Наименование", "Кол-во", "Ед.", "Цена", "Сумма"];
  let widths = [5.0, 20.0, 45.0, 8.0, 6.0, 12.0, 12.0];
  for (col, (title, width)) in columns.iter().zip(widths.iter()).enumerate() {
    let col = col as u16;
    sheet.set_column_width(col, *width).map_err(to_app_err)?;
    sheet.write_string_with_format(0, col, *title, &header_format).map_err(to_app_err)?;
  }

  let mut row: u32 = 1;
  for (idx, line) in order.items.0.iter().enumerate() {
    let line_sum = round2(line.product.price * line.quantity as f64);
    sheet.write_number_with_format(row, 0, (idx + 1) as f64, &cell_format).map_err(to_app_err)?;
    sheet.write_string_with_format(row, 1, &line.product.id, &cell_format).map_err(to_app_err)?;
    sheet.write_string_with_format(row, 2, &line.product.name, &cell_format).map_err(to_app_err)?;
    sheet.write_number_with_format(row, 3, line.quantity as f64, &cell_format).map_err(to_app_err)?;
    sheet.write_string_with_format(row, 4, "шт.", &cell_format).map_err(to_app_err)?;
    sheet.write_number_with_format(row, 5, line.product.price, &money_format).map_err(to_app_err)?;
    sheet.write_number_with_format(row, 6, line_sum, &money_format).map_err(to_app_err)?;
    row += 1;
  }

  // Merged totals row under the item table.
  sheet.merge_range(row, 0, row, 5, "Итого:", &totals_format).map_err(to_app_err)?;
  sheet.write_number_with_format(row, 6, round2(order.total_price), &money_format).map_err(to_app_err)?;
  row += 2;

  // Merged customer-info block.
  let mut info_lines = vec![
    format!("Заказ №{}", order.order_number),
    format!("Клиент: {}", customer.name),
    format!("Телефон: {}", customer.phone),
    format!("Email: {}", customer.email),
    format!("Город: {}", customer.city),
  ];
  if let Some(comment) = customer.comment.as_deref().filter(|c| !c.trim().is_empty()) {
    info_lines.push(format!("Комментарий: {}", comment));
  }
  info_lines.push(format!("Время заказа: {}", order.created_at.format("%d.%m.%Y %H:%M")));

  for (i, line) in info_lines.iter().enumerate() {
    let format = if i == 0 { &bold_format } else { &cell_format };
    sheet.merge_range(row, 0, row, 6, line, format).map_err(to_app_err)?;
    row += 1;
  }

  let bytes = workbook.save_to_buffer().map_err(to_app_err)?;
  Ok(SpreadsheetAttachment {
    filename: format!("order-{}.xlsx", order.order_number),
    bytes,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{CustomerInfo, OrderLine, OrderedProduct};
  use chrono::TimeZone;
  use chrono::Utc;
  use sqlx::types::Json;
  use uuid::Uuid;

  fn sample_order(comment: Option<&str>) -> Order {
    Order {
      id: Uuid::parse_str("0a79c1f4-98f7-4f05-9c4f-21e6a9a3c111").unwrap(),
      order_number: "ORD-0A79C1F4".to_string(),
      items: Json(vec![
        OrderLine {
          product: OrderedProduct {
            id: "p1".to_string(),
            name: "Widget".to_string(),
            price: 100.0,
            image: "https://shop.example.com/images/p1.jpg".to_string(),
          },
          quantity: 2,
        },
        OrderLine {
          product: OrderedProduct {
            id: "p2".to_string(),
            name: "Картридж <углём>".to_string(),
            price: 99.5,
            image: String::new(),
          },
          quantity: 1,
        },
      ]),
      total_price: 299.5,
      customer_info: Json(CustomerInfo {
        email: "a@b.com".to_string(),
        name: "Jo".to_string(),
        phone: "1234567890".to_string(),
        city: "NY".to_string(),
        comment: comment.map(|c| c.to_string()),
      }),
      created_at: Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap(),
    }
  }

  #[test]
  fn message_lists_each_line_item_with_totals() {
    let body = compose_message(&sample_order(None));
    assert!(body.subject.contains("ORD-0A79C1F4"));
    assert!(body.html.contains("Widget — 2 × 100 ₽ = 200 ₽"));
    assert!(body.html.contains("99.5 ₽ = 99.5 ₽"));
    assert!(body.html.contains("<strong>Итог:</strong> 299.5 ₽"));
    assert!(body.text.contains("Widget — 2 × 100 ₽ = 200 ₽"));
    assert!(body.text.contains("Итог: 299.5 ₽"));
  }

  #[test]
  fn message_escapes_html_in_user_fields() {
    let body = compose_message(&sample_order(Some("<script>alert(1)</script>")));
    assert!(body.html.contains("&lt;script&gt;"));
    assert!(!body.html.contains("<script>"));
    assert!(body.html.contains("Картридж &lt;углём&gt;"));
  }

  #[test]
  fn comment_block_is_omitted_when_absent() {
    let without = compose_message(&sample_order(None));
    assert!(!without.html.contains("Комментарий"));
    let with = compose_message(&sample_order(Some("позвонить заранее")));
    assert!(with.html.contains("Комментарий"));
    assert!(with.text.contains("позвонить заранее"));
  }

  #[test]
  fn spreadsheet_builds_a_non_empty_workbook() {
    let attachment = compose_spreadsheet(&sample_order(Some("до 18:00"))).unwrap();
    assert_eq!(attachment.filename, "order-ORD-0A79C1F4.xlsx");
    assert!(!attachment.bytes.is_empty());
    // xlsx files are zip archives
    assert_eq!(&attachment.bytes[..2], b"PK");
  }

  #[test]
  fn sheet_title_fits_excel_limit() {
    let order = sample_order(None);
    assert!(sheet_title(&order).len() <= MAX_SHEET_NAME_LEN);
  }

  #[test]
  fn money_formatting_trims_whole_amounts() {
    assert_eq!(format_money(100.0), "100");
    assert_eq!(format_money(99.5), "99.5");
    assert_eq!(format_money(99.99), "99.99");
    assert_eq!(format_money(0.004), "0");
  }
}
