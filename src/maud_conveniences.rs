use crate::data::user::User;
use maud::{Markup, Render, html};

pub fn render_table<const N: usize>(
    overall_title: impl Render,
    titles: [&'static str; N],
    items: Vec<[Markup; N]>,
) -> Markup {
    html! {
        div class="container mx-auto" {
            (title(overall_title))
            div class="overflow-x-auto" {
                table class="min-w-full bg-gray-800 rounded shadow-md" {
                    thead class="bg-gray-700" {
                        tr {
                            @for title in titles {
                                th class="py-2 px-4 text-left font-semibold text-gray-300" {(title)}
                            }
                        }
                    }
                    tbody {
                        @for row in items {
                            tr {
                                @for col in row {
                                    td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn render_nav(user: Option<&User>) -> Markup {
    let link_class = "hover:text-blue-300 px-3 py-2";

    html! {
        nav class="w-full bg-gray-800 shadow-md px-6 py-3 flex flex-row justify-between items-center" {
            div class="flex flex-row items-center" {
                a href="/" class="text-xl font-bold mr-4" {"Virtue"}
                a href="/timetable" class=(link_class) {"Timetable"}
                @if let Some(user) = user {
                    a href="/students" class=(link_class) {"Students"}
                    a href="/bookings" class=(link_class) {"Bookings"}
                    @if user.is_admin {
                        a href="/admin/classes" class=(link_class) {"Classes"}
                    }
                }
            }
            div class="flex flex-row items-center space-x-4" {
                @if let Some(user) = user {
                    span class="text-gray-300" {(user)}
                    form method="post" action="/logout" {
                        button type="submit" class="bg-slate-600 hover:bg-slate-800 font-bold py-1 px-3 rounded" {"Logout"}
                    }
                } @else {
                    a href="/login" class=(link_class) {"Login"}
                    a href="/sign-up" class="bg-blue-600 hover:bg-blue-800 font-bold py-1 px-3 rounded" {"Sign Up"}
                }
            }
        }
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn supertitle(s: impl Render) -> Markup {
    html! {
        h1 class="text-4xl font-bold mb-6 text-center" {(s)}
    }
}

pub fn form_element(id: &'static str, label: &'static str, element: Markup) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            (element)
        }
    }
}

pub fn simple_form_element(
    id: &'static str,
    label: &'static str,
    required: bool,
    input_type: Option<&'static str>,
    default_value: Option<&str>,
) -> Markup {
    form_element(
        id,
        label,
        html! {
            input required[required] type=(input_type.unwrap_or("text")) id=(id) name=(id) value=[default_value] class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600" {}
        },
    )
}

pub fn form_submit_button(text: Option<&'static str>) -> Markup {
    html! {
        div class="flex items-center justify-between" {
            button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
                (text.unwrap_or("Submit"))
            }
        }
    }
}

pub fn errors_list(errors: impl Iterator<Item = &'static str>) -> Markup {
    html! {
        div role="alert" class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" {
            strong class="font-bold" {"Please fix the following:"}
            ul class="list-disc list-inside" {
                @for error in errors {
                    li {(error)}
                }
            }
        }
    }
}

///a modal which is open as soon as it's rendered, closed with its own button
pub fn open_dialog(heading: impl Render, body: Markup) -> Markup {
    html! {
        dialog open class="fixed inset-0 m-auto bg-gray-800 text-white rounded-lg shadow-xl p-8 max-w-md w-full" {
            h2 class="text-2xl font-semibold mb-4 text-center" {(heading)}
            (body)
            form method="dialog" class="flex justify-center mt-4" {
                button class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {"Close"}
            }
        }
    }
}
